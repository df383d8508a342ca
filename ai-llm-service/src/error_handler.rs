//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums (e.g., [`ConfigError`],
//! [`ProviderError`]). Every error can be classified with [`FailureKind`] so
//! callers can tell recoverable upstream hiccups from fatal misconfiguration.
//! Small helpers for reading/validating environment variables are provided and
//! return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Failure classification                                                    */
/* ------------------------------------------------------------------------- */

/// Coarse failure category shared by every external-service error in the workspace.
///
/// Retrieval and generation degrade gracefully on any kind; the retry helper
/// only repeats [`FailureKind::TransientNetwork`] and [`FailureKind::UpstreamQuota`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Missing/invalid settings or rejected credentials (HTTP 401/403).
    Configuration,
    /// Connect/timeout failures and HTTP 5xx.
    TransientNetwork,
    /// Rate limiting or exhausted quota (HTTP 429).
    UpstreamQuota,
    /// Upstream answered, but the payload had an unexpected shape.
    MalformedResponse,
    /// Any other non-success answer from upstream (e.g., HTTP 400/404).
    Upstream,
    /// Bad local input (files, rows).
    Input,
}

impl FailureKind {
    /// Maps a non-success HTTP status to a failure kind.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Configuration,
            StatusCode::TOO_MANY_REQUESTS => FailureKind::UpstreamQuota,
            StatusCode::REQUEST_TIMEOUT => FailureKind::TransientNetwork,
            s if s.is_server_error() => FailureKind::TransientNetwork,
            _ => FailureKind::Upstream,
        }
    }

    /// Maps a `reqwest` transport error to a failure kind.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status);
        }
        if err.is_decode() {
            return FailureKind::MalformedResponse;
        }
        if err.is_builder() {
            return FailureKind::Configuration;
        }
        FailureKind::TransientNetwork
    }

    /// Whether an operation failing with this kind is worth repeating.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureKind::TransientNetwork | FailureKind::UpstreamQuota
        )
    }
}

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
///
/// Variants wrap domain-specific enums (config/provider) and the HTTP
/// transport error (connect failures and request timeouts land there).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider-specific failures (status, decode, empty output).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

impl AiLlmError {
    /// Classifies this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            AiLlmError::Config(_) => FailureKind::Configuration,
            AiLlmError::Provider(p) => p.kind.failure_kind(),
            AiLlmError::HttpTransport(e) => FailureKind::from_transport(e),
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A boolean failed to parse.
    #[error("[AI LLM Service] invalid boolean in {var}: expected true/false")]
    InvalidBool {
        /// Variable name.
        var: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `GEMINI_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty or invalid.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Upstream provider that produced a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (`generativelanguage.googleapis.com`).
    Gemini,
}

/// Non-success HTTP answer details.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL (without credentials).
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

/// What went wrong while talking to a provider.
#[derive(Debug)]
pub enum ProviderErrorKind {
    /// API key is absent.
    MissingApiKey,
    /// API key cannot be sent as an HTTP header value.
    InvalidApiKey(String),
    /// Endpoint is empty or does not start with http/https.
    InvalidEndpoint(String),
    /// Upstream returned a non-successful HTTP status.
    HttpStatus(HttpError),
    /// Response payload could not be decoded as expected.
    Decode(String),
    /// Upstream answered without any text (e.g., blocked by safety filters).
    EmptyCandidates(String),
}

impl ProviderErrorKind {
    fn failure_kind(&self) -> FailureKind {
        match self {
            ProviderErrorKind::MissingApiKey
            | ProviderErrorKind::InvalidApiKey(_)
            | ProviderErrorKind::InvalidEndpoint(_) => FailureKind::Configuration,
            ProviderErrorKind::HttpStatus(h) => FailureKind::from_status(h.status),
            ProviderErrorKind::Decode(_) | ProviderErrorKind::EmptyCandidates(_) => {
                FailureKind::MalformedResponse
            }
        }
    }
}

/// Provider error with attribution.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider:?}: {kind}")]
pub struct ProviderError {
    /// Which provider failed.
    pub provider: Provider,
    /// Failure details.
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    /// Creates a new provider error.
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorKind::MissingApiKey => f.write_str("missing API key"),
            ProviderErrorKind::InvalidApiKey(e) => write!(f, "invalid API key: {e}"),
            ProviderErrorKind::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            ProviderErrorKind::HttpStatus(h) => {
                write!(f, "HTTP {} from {}: {}", h.status, h.url, h.snippet)
            }
            ProviderErrorKind::Decode(m) => write!(f, "decode error: {m}"),
            ProviderErrorKind::EmptyCandidates(reason) => {
                write!(f, "response contained no text (finish reason: {reason})")
            }
        }
    }
}

/// Trims a response body into a single-line snippet for logs and errors.
pub fn make_snippet(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(240).collect()
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Parses an optional boolean from env (`Ok(None)` if unset/empty).
///
/// Accepts `true/false`, `1/0`, `yes/no` (case-insensitive).
pub fn env_opt_bool(name: &'static str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidBool { var: name }.into()),
        },
        _ => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::OutOfRange`] if `value`
/// is outside `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}
