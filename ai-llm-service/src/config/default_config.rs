//! Default LLM configs loaded from environment variables.
//!
//! The FAQ answerer talks to a single hosted model with fixed, factual-leaning
//! sampling parameters. Only the credential comes from the environment.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY` = API key (mandatory; `GEMINI_API_KEYS` is accepted as a legacy alias)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, ConfigError},
};

/// Base URL of the Gemini REST API.
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for answer generation.
pub const GEMINI_MODEL: &str = "gemini-flash-latest";

/// Sampling temperature: low, favours factual continuations.
pub const GEMINI_TEMPERATURE: f32 = 0.1;

/// Nucleus sampling threshold.
pub const GEMINI_TOP_P: f32 = 0.95;

/// Top-k sampling bound.
pub const GEMINI_TOP_K: u32 = 50;

/// Per-request timeout for generation calls.
pub const GEMINI_TIMEOUT_SECS: u64 = 60;

/// Resolves the Gemini API key.
///
/// Precedence:
/// 1. `GEMINI_API_KEY`
/// 2. `GEMINI_API_KEYS`
///
/// # Errors
/// [`ConfigError::MissingVar`] if both are missing or empty.
fn gemini_api_key() -> Result<String, AiLlmError> {
    ["GEMINI_API_KEY", "GEMINI_API_KEYS"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY or GEMINI_API_KEYS").into())
}

/// Builds the answer-generation config around an explicit API key.
pub fn config_gemini_with_key(api_key: impl Into<String>) -> LlmModelConfig {
    LlmModelConfig {
        model: GEMINI_MODEL.to_string(),
        endpoint: GEMINI_ENDPOINT.to_string(),
        api_key: Some(api_key.into()),
        temperature: Some(GEMINI_TEMPERATURE),
        top_p: Some(GEMINI_TOP_P),
        top_k: Some(GEMINI_TOP_K),
        timeout_secs: Some(GEMINI_TIMEOUT_SECS),
    }
}

/// Constructs the answer-generation config from the environment.
///
/// # Defaults
/// - `model = gemini-flash-latest`
/// - `temperature = 0.1`, `top_p = 0.95`, `top_k = 50`
/// - `timeout_secs = 60`
pub fn config_gemini_default() -> Result<LlmModelConfig, AiLlmError> {
    let cfg = config_gemini_with_key(gemini_api_key()?);
    cfg.validate()?;
    Ok(cfg)
}
