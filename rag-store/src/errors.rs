//! Unified error types for the crate.

use ai_llm_service::{Classify, FailureKind};
use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading / row deserialization errors.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport errors (connect, timeout, body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from Pinecone.
    #[error("pinecone HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Pinecone answered with an unexpected payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// The index does not exist (data-plane call before creation).
    #[error("index '{0}' does not exist")]
    IndexMissing(String),

    /// A freshly created index did not become ready in time.
    #[error("index '{index}' not ready after {waited_secs}s")]
    IndexNotReady { index: String, waited_secs: u64 },
}

impl RagError {
    /// Classifies this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            RagError::Io(_) | RagError::Csv(_) => FailureKind::Input,
            RagError::Parse(_) | RagError::Decode(_) => FailureKind::MalformedResponse,
            RagError::Config(_) | RagError::IndexMissing(_) => FailureKind::Configuration,
            RagError::Transport(e) => FailureKind::from_transport(e),
            RagError::HttpStatus { status, .. } => FailureKind::from_status(*status),
            RagError::IndexNotReady { .. } => FailureKind::TransientNetwork,
        }
    }
}

impl Classify for RagError {
    fn failure_kind(&self) -> FailureKind {
        self.kind()
    }
}
