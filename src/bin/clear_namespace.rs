//! Deletes every record in the FAQ namespace.

use ai_llm_service::error_handler::must_env;
use anyhow::Context;
use faq_rag::telemetry;
use rag_store::{RagConfig, RagStore};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init();

    let key = must_env("PINECONE_API_KEY")?;
    let store = RagStore::connect(RagConfig::faq_default(key)).context("building Pinecone client")?;
    let namespace = store.config().namespace.clone();

    match store.record_count().await {
        Ok(n) => info!(%namespace, records = n, "records before clearing"),
        Err(e) => warn!(%namespace, error = %e, "could not read namespace stats"),
    }

    store
        .clear_namespace()
        .await
        .with_context(|| format!("clearing namespace '{namespace}'"))?;

    info!(%namespace, "cleared all data from namespace");
    Ok(())
}
