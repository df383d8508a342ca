//! FAQ store over a hosted vector index with integrated embedding.
//!
//! This crate provides a small API to:
//! - Ingest a `questions`/`answers` CSV as namespace-scoped records
//! - Retrieve top-K hits for a free-text query
//! - Clear or count the namespace (maintenance)
//!
//! The index is reached through the [`RecordIndex`] trait; [`PineconeFacade`]
//! talks to Pinecone over HTTP, [`InMemoryIndex`] keeps everything in process.

mod config;
mod errors;
mod index;
mod ingest;
mod io_csv;
mod memory_index;
mod pinecone_facade;
mod record;
mod retrieve;

pub use config::{
    FAQ_EMBED_MODEL, FAQ_INDEX_NAME, FAQ_NAMESPACE, FAQ_TOP_K, FAQ_UPSERT_BATCH, RagConfig,
    RowPolicy,
};
pub use errors::RagError;
pub use index::{IndexFuture, RecordIndex};
pub use io_csv::{CsvRows, read_faq_rows};
pub use memory_index::InMemoryIndex;
pub use pinecone_facade::PineconeFacade;
pub use record::{
    FaqRecord, FaqRow, IndexStatus, IngestReport, SearchHit, SearchResponse, SearchResult,
    combined_text, record_id,
};

use std::{path::Path, sync::Arc};

use tracing::{debug, info};

/// High-level facade that wires configuration and the index client.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    index: Arc<dyn RecordIndex>,
}

impl RagStore {
    /// Wraps an existing index client.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the configuration is invalid.
    pub fn new(cfg: RagConfig, index: Arc<dyn RecordIndex>) -> Result<Self, RagError> {
        cfg.validate()?;
        debug!(index = %cfg.index_name, namespace = %cfg.namespace, "RagStore::new");
        Ok(Self { cfg, index })
    }

    /// Builds a store backed by Pinecone.
    pub fn connect(cfg: RagConfig) -> Result<Self, RagError> {
        let facade = PineconeFacade::new(&cfg)?;
        Self::new(cfg, Arc::new(facade))
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Reads the CSV, ensures the index and upserts all rows in batches,
    /// then logs the namespace record count.
    pub async fn ingest_csv(&self, path: impl AsRef<Path>) -> Result<IngestReport, RagError> {
        let report = ingest::ingest_csv(&self.cfg, path, self.index.as_ref()).await?;
        ingest::log_namespace_count(&self.cfg, self.index.as_ref()).await;
        Ok(report)
    }

    /// Fallible search scoped to the configured namespace.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<SearchResponse, RagError> {
        retrieve::search(&self.cfg, self.index.as_ref(), query, top_k).await
    }

    /// Search that never fails: errors are logged and yield no hits.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> SearchResponse {
        retrieve::retrieve(&self.cfg, self.index.as_ref(), query, top_k).await
    }

    /// Deletes every record in the configured namespace.
    pub async fn clear_namespace(&self) -> Result<(), RagError> {
        info!(namespace = %self.cfg.namespace, "clearing namespace");
        self.index.delete_namespace(&self.cfg.namespace).await
    }

    pub async fn record_count(&self) -> Result<u64, RagError> {
        self.index.namespace_count(&self.cfg.namespace).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn ingest_then_retrieve_then_clear() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "questions,answers").unwrap();
        writeln!(f, "What is your return policy?,\"30 days, with receipt.\"").unwrap();

        let idx = Arc::new(InMemoryIndex::new());
        let store = RagStore::new(RagConfig::faq_default("k"), idx.clone()).unwrap();

        let report = store.ingest_csv(f.path()).await.unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(store.record_count().await.unwrap(), 1);

        let resp = store.retrieve("return policy", FAQ_TOP_K).await;
        assert_eq!(
            resp.hits()[0].chunk_text(),
            Some(
                "FAQ Question: What is your return policy? | FAQ Answer: 30 days, with receipt. | Type: FAQ | Source: CSV"
            )
        );

        store.clear_namespace().await.unwrap();
        assert_eq!(store.record_count().await.unwrap(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = RagConfig::faq_default("k");
        cfg.namespace = String::new();
        assert!(RagStore::new(cfg, Arc::new(InMemoryIndex::new())).is_err());
    }
}
