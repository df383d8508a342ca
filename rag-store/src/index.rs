//! The seam between ingestion/retrieval and the hosted index.
//!
//! Implemented over HTTP by [`crate::pinecone_facade::PineconeFacade`] and in
//! memory by [`crate::memory_index::InMemoryIndex`].

use std::{future::Future, pin::Pin};

use crate::errors::RagError;
use crate::record::{FaqRecord, IndexStatus, SearchResponse};

/// Boxed future returned by [`RecordIndex`] methods.
pub type IndexFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// Namespace-scoped record operations on an index with integrated embedding.
pub trait RecordIndex: Send + Sync {
    /// Makes sure the index exists (creating it if absent) and is ready.
    fn ensure_index(&self) -> IndexFuture<'_, IndexStatus>;

    /// Inserts or overwrites `records` (by id) in `namespace`.
    fn upsert_records<'a>(
        &'a self,
        namespace: &'a str,
        records: &'a [FaqRecord],
    ) -> IndexFuture<'a, ()>;

    /// Semantic search by free text; hits come back in index order.
    fn search_records<'a>(
        &'a self,
        namespace: &'a str,
        query: &'a str,
        top_k: usize,
    ) -> IndexFuture<'a, SearchResponse>;

    /// Removes every record in `namespace`.
    fn delete_namespace<'a>(&'a self, namespace: &'a str) -> IndexFuture<'a, ()>;

    /// Number of records currently stored in `namespace`.
    fn namespace_count<'a>(&'a self, namespace: &'a str) -> IndexFuture<'a, u64>;
}
