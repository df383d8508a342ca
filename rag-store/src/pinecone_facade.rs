//! Thin HTTP adapter around the Pinecone REST API.
//!
//! Control plane (`api.pinecone.io`):
//! - `GET  /indexes/{name}` describe (404 means absent)
//! - `POST /indexes/create-for-model` create with an integrated embedding model
//!
//! Data plane (`https://{host}` from the describe response):
//! - `POST /records/namespaces/{ns}/upsert` (NDJSON body)
//! - `POST /records/namespaces/{ns}/search`
//! - `POST /vectors/delete`
//! - `POST /describe_index_stats`
//!
//! Every call runs under the shared retry policy; only transient failures are
//! repeated.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ai_llm_service::{RetryPolicy, error_handler::make_snippet, retry_async};
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::index::{IndexFuture, RecordIndex};
use crate::record::{FaqRecord, IndexStatus, SearchResponse};

const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Pinecone client bound to one index.
pub struct PineconeFacade {
    client: reqwest::Client,
    cfg: RagConfig,
    /// Data-plane base URL, resolved once from the describe call.
    host: OnceCell<String>,
    retry: RetryPolicy,
}

impl PineconeFacade {
    /// Builds the HTTP client. No network traffic happens here.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut key = header::HeaderValue::from_str(&cfg.api_key)
            .map_err(|e| RagError::Config(format!("invalid api key header: {e}")))?;
        key.set_sensitive(true);

        let version = header::HeaderValue::from_str(&cfg.api_version)
            .map_err(|e| RagError::Config(format!("invalid api version header: {e}")))?;

        let mut headers = header::HeaderMap::new();
        headers.insert("api-key", key);
        headers.insert("x-pinecone-api-version", version);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .gzip(true)
            .build()?;

        info!(
            index = %cfg.index_name,
            namespace = %cfg.namespace,
            timeout_secs = cfg.timeout_secs,
            "PineconeFacade initialized"
        );

        Ok(Self {
            client,
            cfg: cfg.clone(),
            host: OnceCell::new(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn describe_url(&self) -> String {
        format!(
            "{}/indexes/{}",
            self.cfg.control_url.trim_end_matches('/'),
            self.cfg.index_name
        )
    }

    /// `None` when the index does not exist.
    async fn describe_once(&self) -> Result<Option<IndexDescription>, RagError> {
        let url = self.describe_url();
        debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp, &url).await?;
        let desc = resp
            .json::<IndexDescription>()
            .await
            .map_err(|e| RagError::Decode(format!("describe index: {e}")))?;
        Ok(Some(desc))
    }

    async fn describe(&self) -> Result<Option<IndexDescription>, RagError> {
        retry_async(&self.retry, "pinecone.describe_index", || self.describe_once()).await
    }

    async fn create_once(&self) -> Result<(), RagError> {
        let url = format!(
            "{}/indexes/create-for-model",
            self.cfg.control_url.trim_end_matches('/')
        );
        let body = CreateForModel::from_cfg(&self.cfg);
        debug!("POST {url}");
        let resp = self.client.post(&url).json(&body).send().await?;
        if resp.status() == StatusCode::CONFLICT {
            debug!(index = %self.cfg.index_name, "index already exists (409)");
            return Ok(());
        }
        check_status(resp, &url).await?;
        Ok(())
    }

    /// Polls describe until the index reports ready.
    async fn wait_ready(&self) -> Result<IndexDescription, RagError> {
        let started = Instant::now();
        let limit = Duration::from_secs(self.cfg.ready_timeout_secs);
        loop {
            if let Some(desc) = self.describe().await? {
                if desc.status.ready {
                    info!(
                        index = %self.cfg.index_name,
                        waited_ms = started.elapsed().as_millis() as u64,
                        "index is ready"
                    );
                    return Ok(desc);
                }
                debug!(state = ?desc.status.state, "index not ready yet");
            }
            if started.elapsed() >= limit {
                return Err(RagError::IndexNotReady {
                    index: self.cfg.index_name.clone(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Resolves the data-plane host, describing the index on first use.
    async fn host(&self) -> Result<&str, RagError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                match self.describe().await? {
                    Some(desc) => Ok(data_plane_base(&desc.host)),
                    None => Err(RagError::IndexMissing(self.cfg.index_name.clone())),
                }
            })
            .await?;
        Ok(host.as_str())
    }

    async fn ensure(&self) -> Result<IndexStatus, RagError> {
        if let Some(desc) = self.describe().await? {
            debug!(index = %self.cfg.index_name, host = %desc.host, "index exists");
            let desc = if desc.status.ready {
                desc
            } else {
                self.wait_ready().await?
            };
            let _ = self.host.set(data_plane_base(&desc.host));
            return Ok(IndexStatus::Existing);
        }

        warn!(
            index = %self.cfg.index_name,
            model = %self.cfg.embed_model,
            "index not found, creating it"
        );
        retry_async(&self.retry, "pinecone.create_index", || self.create_once()).await?;
        let desc = self.wait_ready().await?;
        let _ = self.host.set(data_plane_base(&desc.host));
        Ok(IndexStatus::Created)
    }

    #[instrument(skip_all, fields(namespace = %namespace, count = records.len()))]
    async fn upsert(&self, namespace: &str, records: &[FaqRecord]) -> Result<(), RagError> {
        if records.is_empty() {
            return Ok(());
        }
        let url = format!("{}/records/namespaces/{namespace}/upsert", self.host().await?);
        let body = ndjson(records)?;
        let (url, body) = (&url, &body);
        retry_async(&self.retry, "pinecone.upsert_records", move || async move {
            debug!("POST {url}");
            let resp = self
                .client
                .post(url)
                .header(header::CONTENT_TYPE, "application/x-ndjson")
                .body(body.clone())
                .send()
                .await?;
            check_status(resp, url).await?;
            Ok(())
        })
        .await
    }

    #[instrument(skip_all, fields(namespace = %namespace, top_k, query_len = query.len()))]
    async fn search(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<SearchResponse, RagError> {
        let url = format!("{}/records/namespaces/{namespace}/search", self.host().await?);
        let body = search_body(query, top_k);
        let (url, body) = (&url, &body);
        retry_async(&self.retry, "pinecone.search_records", move || async move {
            let started = Instant::now();
            debug!("POST {url}");
            let resp = self.client.post(url).json(body).send().await?;
            let resp = check_status(resp, url).await?;
            let out = resp
                .json::<SearchResponse>()
                .await
                .map_err(|e| RagError::Decode(format!("search records: {e}")))?;
            debug!(
                hits = out.hits().len(),
                latency_ms = started.elapsed().as_millis() as u64,
                "search completed"
            );
            Ok(out)
        })
        .await
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), RagError> {
        let url = format!("{}/vectors/delete", self.host().await?);
        let body = json!({ "deleteAll": true, "namespace": namespace });
        let (url, body) = (&url, &body);
        retry_async(&self.retry, "pinecone.delete_namespace", move || async move {
            debug!("POST {url}");
            let resp = self.client.post(url).json(body).send().await?;
            if resp.status() == StatusCode::NOT_FOUND {
                debug!(namespace, "namespace already empty");
                return Ok(());
            }
            check_status(resp, url).await?;
            Ok(())
        })
        .await
    }

    async fn count(&self, namespace: &str) -> Result<u64, RagError> {
        let url = format!("{}/describe_index_stats", self.host().await?);
        let url = &url;
        let stats: IndexStats = retry_async(&self.retry, "pinecone.describe_index_stats", move || async move {
            debug!("POST {url}");
            let resp = self.client.post(url).json(&json!({})).send().await?;
            let resp = check_status(resp, url).await?;
            resp.json::<IndexStats>()
                .await
                .map_err(|e| RagError::Decode(format!("describe index stats: {e}")))
        })
        .await?;
        Ok(stats
            .namespaces
            .get(namespace)
            .map_or(0, |ns| ns.vector_count))
    }
}

impl RecordIndex for PineconeFacade {
    fn ensure_index(&self) -> IndexFuture<'_, IndexStatus> {
        Box::pin(self.ensure())
    }

    fn upsert_records<'a>(
        &'a self,
        namespace: &'a str,
        records: &'a [FaqRecord],
    ) -> IndexFuture<'a, ()> {
        Box::pin(self.upsert(namespace, records))
    }

    fn search_records<'a>(
        &'a self,
        namespace: &'a str,
        query: &'a str,
        top_k: usize,
    ) -> IndexFuture<'a, SearchResponse> {
        Box::pin(self.search(namespace, query, top_k))
    }

    fn delete_namespace<'a>(&'a self, namespace: &'a str) -> IndexFuture<'a, ()> {
        Box::pin(self.delete_all(namespace))
    }

    fn namespace_count<'a>(&'a self, namespace: &'a str) -> IndexFuture<'a, u64> {
        Box::pin(self.count(namespace))
    }
}

/* ===========================================================================
Helpers & payloads
======================================================================== */

/// Turns a non-success response into [`RagError::HttpStatus`].
async fn check_status(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, RagError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let snippet = make_snippet(&text);
    error!(%status, %url, %snippet, "pinecone returned non-success status");
    Err(RagError::HttpStatus {
        status,
        url: url.to_string(),
        snippet,
    })
}

/// Describe responses carry a bare host name; a full URL is kept as is.
fn data_plane_base(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn ndjson(records: &[FaqRecord]) -> Result<String, RagError> {
    let mut out = String::new();
    for rec in records {
        out.push_str(&serde_json::to_string(rec)?);
        out.push('\n');
    }
    Ok(out)
}

fn search_body(query: &str, top_k: usize) -> serde_json::Value {
    json!({
        "query": { "inputs": { "text": query }, "top_k": top_k },
        "fields": ["chunk_text", "question", "answer"]
    })
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    status: IndexState,
}

#[derive(Debug, Default, Deserialize)]
struct IndexState {
    #[serde(default)]
    ready: bool,
    state: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateForModel<'a> {
    name: &'a str,
    cloud: &'a str,
    region: &'a str,
    embed: EmbedSpec<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedSpec<'a> {
    model: &'a str,
    field_map: HashMap<&'static str, &'a str>,
}

impl<'a> CreateForModel<'a> {
    fn from_cfg(cfg: &'a RagConfig) -> Self {
        Self {
            name: &cfg.index_name,
            cloud: &cfg.cloud,
            region: &cfg.region,
            embed: EmbedSpec {
                model: &cfg.embed_model,
                field_map: HashMap::from([("text", cfg.text_field.as_str())]),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}
