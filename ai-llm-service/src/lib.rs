//! Hosted LLM generation for the FAQ answerer.
//!
//! - [`services::gemini_service::GeminiService`]: non-streaming Gemini client
//! - [`TextGeneration`]: the seam used by callers (and by test doubles)
//! - [`error_handler`]: unified errors plus the [`FailureKind`] taxonomy shared
//!   with the vector-index crate
//! - [`retry`]: bounded exponential backoff for transient failures

pub mod config;
pub mod error_handler;
pub mod generation;
pub mod retry;
pub mod services;

pub use config::default_config::{config_gemini_default, config_gemini_with_key};
pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, FailureKind};
pub use generation::{GenerateFuture, TextGeneration};
pub use retry::{Classify, RetryPolicy, retry_async};
pub use services::gemini_service::GeminiService;
