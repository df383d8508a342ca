//! Generation abstraction.
//!
//! Implement [`TextGeneration`] to plug in a hosted model (see
//! [`crate::services::gemini_service::GeminiService`]) or a test double.

use std::{future::Future, pin::Pin};

use crate::error_handler::AiLlmError;

/// Boxed future returned by [`TextGeneration::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;

/// Single-prompt, non-streaming text generation.
pub trait TextGeneration: Send + Sync {
    /// Generates a completion for `prompt` using the implementation's fixed
    /// model and sampling parameters.
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
