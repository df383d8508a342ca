//! Retrieval: one namespace-scoped semantic search per query.

use tracing::{debug, error, trace};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::index::RecordIndex;
use crate::record::SearchResponse;

/// Runs the search and returns hits in index order.
///
/// # Errors
/// Propagates the index error unchanged.
pub async fn search(
    cfg: &RagConfig,
    index: &dyn RecordIndex,
    query: &str,
    top_k: usize,
) -> Result<SearchResponse, RagError> {
    trace!(top_k, query_len = query.len(), "retrieve::search");
    let resp = index.search_records(&cfg.namespace, query, top_k).await?;
    debug!(hits = resp.hits().len(), "retrieved");
    Ok(resp)
}

/// Like [`search`], but any failure is logged and turned into an empty result.
pub async fn retrieve(
    cfg: &RagConfig,
    index: &dyn RecordIndex,
    query: &str,
    top_k: usize,
) -> SearchResponse {
    match search(cfg, index, query, top_k).await {
        Ok(resp) => resp,
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, details = ?e, "search failed, continuing without context");
            SearchResponse::empty()
        }
    }
}
