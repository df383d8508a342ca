//! Startup sequence and wiring of the production clients.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use ai_llm_service::{GeminiService, TextGeneration};
use contextor::FaqAnswerer;
use rag_store::{IngestReport, RagStore};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::StartupError;
use crate::repl::{self, ReplExit};

/// Verifies the CSV exists and loads it into the index, printing progress.
///
/// # Errors
/// - [`StartupError::CsvMissing`] before any index call if the file is absent
/// - [`StartupError::Ingestion`] if reading or upserting fails
pub async fn startup<W: Write>(
    store: &RagStore,
    csv_path: &Path,
    out: &mut W,
) -> Result<IngestReport, StartupError> {
    if !csv_path.is_file() {
        return Err(StartupError::CsvMissing(csv_path.to_path_buf()));
    }

    writeln!(out, "Checking Pinecone index...")?;
    out.flush()?;

    let report = store.ingest_csv(csv_path).await.map_err(|e| {
        error!(kind = ?e.kind(), error = %e, details = ?e, "FAQ ingestion failed");
        StartupError::Ingestion(e)
    })?;
    info!(
        records = report.records,
        batches = report.batches,
        skipped = report.skipped,
        "FAQ ingested"
    );

    repl::print_ready(out)?;
    Ok(report)
}

/// Builds the clients, ingests the FAQ and runs the question loop on stdin.
pub async fn run(cfg: AppConfig) -> Result<ReplExit, StartupError> {
    let store = Arc::new(RagStore::connect(cfg.rag.clone()).map_err(StartupError::Store)?);
    let llm: Arc<dyn TextGeneration> = Arc::new(GeminiService::new(cfg.llm.clone())?);

    let mut stdout = io::stdout();
    startup(&store, &cfg.csv_path, &mut stdout).await?;

    let answerer = FaqAnswerer::new(store, llm);
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let exit = repl::run_loop(input, &mut stdout, &answerer, shutdown_signal()).await?;

    info!(?exit, "session ended");
    Ok(exit)
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::GenerateFuture;
    use rag_store::{InMemoryIndex, RagConfig};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGeneration for RecordingLlm {
        fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Box::pin(async { Ok("You can return items within 30 days.".to_string()) })
        }
        fn model(&self) -> &str {
            "recording"
        }
    }

    fn store(index: Arc<InMemoryIndex>) -> RagStore {
        RagStore::new(RagConfig::faq_default("k"), index).unwrap()
    }

    #[tokio::test]
    async fn missing_csv_stops_before_ingestion() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("faqs.csv");
        let index = Arc::new(InMemoryIndex::new());
        let mut out = Vec::new();

        let err = startup(&store(index.clone()), &csv, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, StartupError::CsvMissing(ref p) if p == &csv));
        assert!(err.user_message().contains(&csv.display().to_string()));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(index.upsert_calls(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn bad_csv_is_an_ingestion_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("faqs.csv");
        std::fs::write(&csv, "q,a\nx,y\n").unwrap();

        let err = startup(&store(Arc::new(InMemoryIndex::new())), &csv, &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn ingested_row_reaches_the_prompt() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("faqs.csv");
        std::fs::write(
            &csv,
            "questions,answers\nWhat is your return policy?,\"30 days, with receipt.\"\n",
        )
        .unwrap();

        let index = Arc::new(InMemoryIndex::new());
        let store = Arc::new(store(index.clone()));
        let mut out = Vec::new();
        let report = startup(&store, &csv, &mut out).await.unwrap();
        assert_eq!(report.records, 1);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Checking Pinecone index..."));
        assert!(out.contains("RAG System is ready!"));

        let llm = Arc::new(RecordingLlm::default());
        let answerer = FaqAnswerer::new(store, llm.clone());
        let qa = answerer.ask("What is your return policy?").await;

        let expected = "FAQ Question: What is your return policy? | FAQ Answer: 30 days, with receipt. | Type: FAQ | Source: CSV";
        assert_eq!(qa.context, vec![expected.to_string()]);
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(&format!("[FAQ 1]\n{expected}")));
        assert!(prompts[0].contains("USER QUESTION:\nWhat is your return policy?"));
    }
}
