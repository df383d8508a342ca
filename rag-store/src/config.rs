//! Index, namespace and ingestion configuration.

use crate::errors::RagError;

/// Pinecone control-plane base URL.
pub const PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";
/// API version pinned for every request.
pub const PINECONE_API_VERSION: &str = "2025-01";

/// Index holding the FAQ records.
pub const FAQ_INDEX_NAME: &str = "developer-quickstart-py";
pub const FAQ_CLOUD: &str = "aws";
pub const FAQ_REGION: &str = "us-east-1";
/// Hosted embedding model bound to the index at creation time.
pub const FAQ_EMBED_MODEL: &str = "text-embedding-3-large";
/// Record field the hosted model embeds.
pub const FAQ_TEXT_FIELD: &str = "chunk_text";
pub const FAQ_NAMESPACE: &str = "faq";
pub const FAQ_UPSERT_BATCH: usize = 50;
pub const FAQ_TOP_K: usize = 10;

/// What to do with a CSV row that fails to deserialize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Abort the whole ingestion on the first bad row.
    #[default]
    Strict,
    /// Log and skip bad rows; surviving rows keep their original ordinal.
    SkipMalformed,
}

/// Configuration for FAQ ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Pinecone API key (sent as the `Api-Key` header, marked sensitive).
    pub api_key: String,
    /// Control-plane base URL, e.g. `https://api.pinecone.io`.
    pub control_url: String,
    /// Value of the `X-Pinecone-API-Version` header.
    pub api_version: String,
    pub index_name: String,
    pub cloud: String,
    pub region: String,
    pub embed_model: String,
    pub text_field: String,
    pub namespace: String,
    /// Records per upsert call.
    pub upsert_batch: usize,
    /// Default number of hits requested per search.
    pub top_k: usize,
    pub row_policy: RowPolicy,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// How long to wait for a freshly created index to report ready.
    pub ready_timeout_secs: u64,
}

impl RagConfig {
    /// FAQ defaults with the given API key.
    pub fn faq_default(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            control_url: PINECONE_CONTROL_URL.into(),
            api_version: PINECONE_API_VERSION.into(),
            index_name: FAQ_INDEX_NAME.into(),
            cloud: FAQ_CLOUD.into(),
            region: FAQ_REGION.into(),
            embed_model: FAQ_EMBED_MODEL.into(),
            text_field: FAQ_TEXT_FIELD.into(),
            namespace: FAQ_NAMESPACE.into(),
            upsert_batch: FAQ_UPSERT_BATCH,
            top_k: FAQ_TOP_K,
            row_policy: RowPolicy::Strict,
            timeout_secs: 30,
            ready_timeout_secs: 120,
        }
    }

    pub fn with_row_policy(mut self, policy: RowPolicy) -> Self {
        self.row_policy = policy;
        self
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.api_key.trim().is_empty() {
            return Err(RagError::Config("api_key is empty".into()));
        }
        if !(self.control_url.starts_with("http://") || self.control_url.starts_with("https://")) {
            return Err(RagError::Config(format!(
                "control_url must start with http:// or https:// (got '{}')",
                self.control_url
            )));
        }
        if self.index_name.trim().is_empty() {
            return Err(RagError::Config("index_name is empty".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(RagError::Config("namespace is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be > 0".into()));
        }
        Ok(())
    }
}
