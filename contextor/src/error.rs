//! Typed error for the contextor crate.

use thiserror::Error;

/// Retrieval never fails (it degrades to an empty context), so generation is
/// the only fallible step of a question.
#[derive(Debug, Error)]
pub enum ContextorError {
    /// Generation call failed (after retries).
    #[error("generation error: {0}")]
    Generation(#[from] ai_llm_service::AiLlmError),
}

impl ContextorError {
    pub fn kind(&self) -> ai_llm_service::FailureKind {
        match self {
            ContextorError::Generation(e) => e.kind(),
        }
    }
}
