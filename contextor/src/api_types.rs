//! Public API types re-used by front-ends (interactive loop, future services).

/// How an answer was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The model produced the text from retrieved context.
    Generated,
    /// Retrieval yielded nothing usable; no generation call was made.
    NoContext,
    /// Generation failed; the answer is the apology message.
    Failed,
}

/// Final answer together with the chunk texts passed to the model.
///
/// # Example
/// ```
/// use contextor::{AnswerOutcome, QaAnswer};
/// let qa = QaAnswer {
///     answer: "30 days, with receipt.".into(),
///     outcome: AnswerOutcome::Generated,
///     context: vec!["FAQ Question: ... | FAQ Answer: ...".into()],
/// };
/// assert!(!qa.answer.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QaAnswer {
    pub answer: String,
    pub outcome: AnswerOutcome,
    /// Chunk texts in prompt order (empty for `NoContext`).
    pub context: Vec<String>,
}
