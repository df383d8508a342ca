//! In-process [`RecordIndex`] keyed by record id.
//!
//! Scores hits by lowercase word overlap between the query and `chunk_text`.
//! Used for offline runs and as the index double in tests across the workspace.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::StatusCode;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::RagError;
use crate::index::{IndexFuture, RecordIndex};
use crate::record::{FaqRecord, IndexStatus, SearchHit, SearchResponse};

#[derive(Default)]
pub struct InMemoryIndex {
    /// namespace -> id -> record
    namespaces: Mutex<BTreeMap<String, BTreeMap<String, FaqRecord>>>,
    created: Mutex<bool>,
    upsert_calls: AtomicUsize,
    search_calls: AtomicUsize,
    search_failure: Option<StatusCode>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every search fails with the given HTTP status.
    pub fn failing_search(status: StatusCode) -> Self {
        Self {
            search_failure: Some(status),
            ..Self::default()
        }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the records in `namespace`, ordered by id.
    pub async fn records(&self, namespace: &str) -> Vec<FaqRecord> {
        self.namespaces
            .lock()
            .await
            .get(namespace)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn to_hit(rec: &FaqRecord, score: f32) -> SearchHit {
    let mut fields = Map::new();
    fields.insert("chunk_text".into(), Value::String(rec.chunk_text.clone()));
    fields.insert("question".into(), Value::String(rec.question.clone()));
    fields.insert("answer".into(), Value::String(rec.answer.clone()));
    SearchHit {
        id: rec.id.clone(),
        score,
        fields,
    }
}

impl RecordIndex for InMemoryIndex {
    fn ensure_index(&self) -> IndexFuture<'_, IndexStatus> {
        Box::pin(async move {
            let mut created = self.created.lock().await;
            if *created {
                Ok(IndexStatus::Existing)
            } else {
                *created = true;
                Ok(IndexStatus::Created)
            }
        })
    }

    fn upsert_records<'a>(
        &'a self,
        namespace: &'a str,
        records: &'a [FaqRecord],
    ) -> IndexFuture<'a, ()> {
        Box::pin(async move {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            let mut guard = self.namespaces.lock().await;
            let ns = guard.entry(namespace.to_string()).or_default();
            for rec in records {
                ns.insert(rec.id.clone(), rec.clone());
            }
            debug!(namespace, count = records.len(), "in-memory upsert");
            Ok(())
        })
    }

    fn search_records<'a>(
        &'a self,
        namespace: &'a str,
        query: &'a str,
        top_k: usize,
    ) -> IndexFuture<'a, SearchResponse> {
        Box::pin(async move {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.search_failure {
                return Err(RagError::HttpStatus {
                    status,
                    url: format!("memory://{namespace}/search"),
                    snippet: "injected failure".into(),
                });
            }

            let wanted = tokens(query);
            let guard = self.namespaces.lock().await;
            let Some(ns) = guard.get(namespace) else {
                return Ok(SearchResponse::empty());
            };

            let mut scored: Vec<(f32, &FaqRecord)> = ns
                .values()
                .filter_map(|rec| {
                    let have = tokens(&rec.chunk_text);
                    let overlap = wanted.intersection(&have).count();
                    (overlap > 0).then(|| (overlap as f32 / wanted.len().max(1) as f32, rec))
                })
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            scored.truncate(top_k);

            Ok(SearchResponse::from_hits(
                scored.into_iter().map(|(s, r)| to_hit(r, s)).collect(),
            ))
        })
    }

    fn delete_namespace<'a>(&'a self, namespace: &'a str) -> IndexFuture<'a, ()> {
        Box::pin(async move {
            self.namespaces.lock().await.remove(namespace);
            Ok(())
        })
    }

    fn namespace_count<'a>(&'a self, namespace: &'a str) -> IndexFuture<'a, u64> {
        Box::pin(async move {
            Ok(self
                .namespaces
                .lock()
                .await
                .get(namespace)
                .map_or(0, |m| m.len() as u64))
        })
    }
}
