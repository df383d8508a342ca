//! Retrieval-augmented FAQ answers.
//!
//! Public API: [`FaqAnswerer::ask`]. It retrieves top-K FAQ rows from
//! `rag-store`, formats them as a numbered context block, builds a single
//! prompt with fixed system rules and calls the generation service. It never
//! fails: no context yields [`NO_INFORMATION_MESSAGE`] without calling the
//! model, and a failed generation yields [`APOLOGY_MESSAGE`].

mod api_types;
mod error;
mod progress;
pub mod prompt;

pub use api_types::{AnswerOutcome, QaAnswer};
pub use error::ContextorError;
pub use progress::{IndicatifProgress, NoopProgress, Progress};

use std::sync::Arc;

use ai_llm_service::TextGeneration;
use rag_store::RagStore;
use tracing::{debug, error, info, instrument};

/// Returned when retrieval produced no usable context.
pub const NO_INFORMATION_MESSAGE: &str =
    "I couldn't find any relevant information to answer your question.";

/// Returned when the generation call failed.
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I encountered an error while processing your request.";

/// Stateless question answerer; each call is independent.
pub struct FaqAnswerer {
    store: Arc<RagStore>,
    llm: Arc<dyn TextGeneration>,
    top_k: usize,
}

impl FaqAnswerer {
    /// Uses the store's configured top-K.
    pub fn new(store: Arc<RagStore>, llm: Arc<dyn TextGeneration>) -> Self {
        let top_k = store.config().top_k;
        Self { store, llm, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answers `question`; see the crate docs for the fallback rules.
    pub async fn ask(&self, question: &str) -> QaAnswer {
        self.ask_with_progress(question, &NoopProgress).await
    }

    /// Same as [`ask`](Self::ask), reporting the two phases to `prog`.
    #[instrument(skip_all, fields(query_len = question.len(), top_k = self.top_k))]
    pub async fn ask_with_progress(&self, question: &str, prog: &dyn Progress) -> QaAnswer {
        prog.message("searching FAQ");
        let hits = self.store.retrieve(question, self.top_k).await;
        let chunks = prompt::context_chunks(hits.hits());
        debug!(hits = hits.hits().len(), chunks = chunks.len(), "context collected");

        if chunks.is_empty() {
            prog.finish("no context");
            info!("no relevant FAQ rows, skipping generation");
            return QaAnswer {
                answer: NO_INFORMATION_MESSAGE.to_string(),
                outcome: AnswerOutcome::NoContext,
                context: Vec::new(),
            };
        }

        prog.step("generating answer");
        let result = self.generate(question, &chunks).await;
        prog.finish("done");

        match result {
            Ok(answer) => QaAnswer {
                answer,
                outcome: AnswerOutcome::Generated,
                context: chunks,
            },
            Err(e) => {
                error!(kind = ?e.kind(), error = %e, details = ?e, "answer generation failed");
                QaAnswer {
                    answer: APOLOGY_MESSAGE.to_string(),
                    outcome: AnswerOutcome::Failed,
                    context: chunks,
                }
            }
        }
    }

    async fn generate(&self, question: &str, chunks: &[String]) -> Result<String, ContextorError> {
        let context = prompt::build_context(chunks);
        let full = prompt::build_prompt(prompt::SYSTEM_PROMPT, &context, question);
        debug!(model = self.llm.model(), prompt_len = full.len(), "calling generation");
        Ok(self.llm.generate(&full).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
    use ai_llm_service::{AiLlmError, FailureKind, GenerateFuture};
    use rag_store::{FaqRecord, FaqRow, InMemoryIndex, RagConfig, RecordIndex};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Records every prompt; fails when `fail` is set.
    #[derive(Default)]
    struct FakeLlm {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeLlm {
        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    impl TextGeneration for FakeLlm {
        fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(AiLlmError::from(ProviderError::new(
                        Provider::Gemini,
                        ProviderErrorKind::EmptyCandidates("SAFETY".into()),
                    )))
                } else {
                    Ok("30 days, with receipt.".to_string())
                }
            })
        }
        fn model(&self) -> &str {
            "fake"
        }
    }

    async fn seeded(index: Arc<InMemoryIndex>) -> Arc<RagStore> {
        let rows = [
            ("What is your return policy?", "30 days, with receipt."),
            ("Do you ship abroad?", "Yes, to most countries."),
        ];
        let records: Vec<FaqRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, (q, a))| {
                FaqRecord::from_row(
                    i,
                    &FaqRow {
                        question: q.to_string(),
                        answer: a.to_string(),
                    },
                )
            })
            .collect();
        index.upsert_records("faq", &records).await.unwrap();
        Arc::new(RagStore::new(RagConfig::faq_default("k"), index).unwrap())
    }

    #[tokio::test]
    async fn no_hits_skip_generation() {
        let store = Arc::new(
            RagStore::new(RagConfig::faq_default("k"), Arc::new(InMemoryIndex::new())).unwrap(),
        );
        let llm = Arc::new(FakeLlm::default());
        let qa = FaqAnswerer::new(store, llm.clone()).ask("anything").await;

        assert_eq!(qa.answer, NO_INFORMATION_MESSAGE);
        assert_eq!(qa.outcome, AnswerOutcome::NoContext);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn prompt_carries_rules_context_and_question() {
        let store = seeded(Arc::new(InMemoryIndex::new())).await;
        let llm = Arc::new(FakeLlm::default());
        let qa = FaqAnswerer::new(store, llm.clone())
            .ask("What is the return policy?")
            .await;

        assert_eq!(qa.outcome, AnswerOutcome::Generated);
        assert_eq!(qa.answer, "30 days, with receipt.");
        assert_eq!(llm.calls(), 1);

        let prompt = llm.last_prompt();
        assert!(prompt.starts_with("SYSTEM INSTRUCTIONS:\n"));
        assert!(prompt.contains(prompt::SYSTEM_PROMPT));
        assert!(prompt.contains("USER QUESTION:\nWhat is the return policy?"));
        let mut pos = 0;
        for (i, chunk) in qa.context.iter().enumerate() {
            let block = format!("[FAQ {}]\n{}", i + 1, chunk);
            let at = prompt[pos..].find(&block).expect("context block in order");
            pos += at + block.len();
        }
        assert!(prompt.contains("FAQ Answer: 30 days, with receipt."));
    }

    #[tokio::test]
    async fn search_failure_falls_through_to_no_information() {
        let index = Arc::new(InMemoryIndex::failing_search(StatusCode::INTERNAL_SERVER_ERROR));
        let store = Arc::new(RagStore::new(RagConfig::faq_default("k"), index.clone()).unwrap());
        let llm = Arc::new(FakeLlm::default());

        let qa = FaqAnswerer::new(store, llm.clone()).ask("refunds").await;
        assert_eq!(qa.answer, NO_INFORMATION_MESSAGE);
        assert_eq!(index.search_calls(), 1);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn generation_failure_returns_apology() {
        let store = seeded(Arc::new(InMemoryIndex::new())).await;
        let llm = Arc::new(FakeLlm {
            fail: true,
            ..FakeLlm::default()
        });

        let qa = FaqAnswerer::new(store, llm).ask("return policy").await;
        assert_eq!(qa.answer, APOLOGY_MESSAGE);
        assert_eq!(qa.outcome, AnswerOutcome::Failed);
        assert!(!qa.context.is_empty());
    }

    #[tokio::test]
    async fn top_k_comes_from_store_config() {
        let store = seeded(Arc::new(InMemoryIndex::new())).await;
        let llm: Arc<dyn TextGeneration> = Arc::new(FakeLlm::default());
        assert_eq!(FaqAnswerer::new(store, llm).top_k(), 10);
    }

    #[tokio::test]
    async fn generation_error_keeps_its_kind() {
        let store = seeded(Arc::new(InMemoryIndex::new())).await;
        let llm = Arc::new(FakeLlm {
            fail: true,
            ..FakeLlm::default()
        });
        let chunks = vec!["FAQ Question: a | FAQ Answer: b".to_string()];
        let err = FaqAnswerer::new(store, llm)
            .generate("q", &chunks)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }
}
