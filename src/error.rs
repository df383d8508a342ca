//! Startup failures and how they surface to the user.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    /// Missing credentials or invalid generation settings.
    #[error("configuration error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Invalid index settings or client construction failure.
    #[error("index configuration error: {0}")]
    Store(#[source] rag_store::RagError),

    #[error("could not find FAQ CSV file at {}", .0.display())]
    CsvMissing(PathBuf),

    /// Any failure while loading the CSV into the index.
    #[error("ingestion failed: {0}")]
    Ingestion(#[source] rag_store::RagError),

    /// Data directory creation or console output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StartupError {
    /// Process exit code: 2 for ingestion, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Ingestion(_) => 2,
            _ => 1,
        }
    }

    /// Short text for the console; details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            StartupError::CsvMissing(path) => format!(
                "Error: Could not find FAQ CSV file at {}\nPlease ensure the file exists and try again.",
                path.display()
            ),
            StartupError::Ingestion(_) => {
                "Failed to initialize Pinecone index. Please check your configuration.".to_string()
            }
            StartupError::Llm(_) | StartupError::Store(_) => {
                format!("Error: {self}\nPlease check your environment (.env) and try again.")
            }
            StartupError::Io(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let missing = StartupError::CsvMissing(PathBuf::from("data/faqs.csv"));
        assert_eq!(missing.exit_code(), 1);
        assert!(missing.user_message().contains("data/faqs.csv"));

        let ingest = StartupError::Ingestion(rag_store::RagError::Config("boom".into()));
        assert_eq!(ingest.exit_code(), 2);
        assert!(!ingest.user_message().contains("boom"));
    }
}
