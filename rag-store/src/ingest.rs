//! Ingestion pipeline: read CSV → shape records → ensure index → batched upsert.
//!
//! Record ids derive from the row ordinal (`faq_<n>`), so re-running over the
//! same file overwrites the previous values instead of duplicating them.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::index::RecordIndex;
use crate::io_csv::read_faq_rows;
use crate::record::{FaqRecord, IngestReport};

/// Ingests the FAQ CSV at `path` into the configured namespace.
///
/// The file is read in full before any network call, so a bad file never
/// touches the index.
///
/// # Errors
/// - [`RagError::Io`] / [`RagError::Csv`] for file and row problems
/// - any index error from ensure/upsert
pub async fn ingest_csv(
    cfg: &RagConfig,
    path: impl AsRef<Path>,
    index: &dyn RecordIndex,
) -> Result<IngestReport, RagError> {
    let path = path.as_ref();
    info!(path = %path.display(), namespace = %cfg.namespace, "ingesting FAQ CSV");

    let csv = read_faq_rows(path, cfg.row_policy)?;
    let records: Vec<FaqRecord> = csv
        .rows
        .iter()
        .map(|(ordinal, row)| FaqRecord::from_row(*ordinal, row))
        .collect();

    let status = index.ensure_index().await?;
    debug!(?status, index = %cfg.index_name, "index ensured");

    let mut report = upsert_batched(cfg, &records, index).await?;
    report.skipped = csv.skipped;

    info!(
        records = report.records,
        batches = report.batches,
        skipped = report.skipped,
        "ingestion finished"
    );
    Ok(report)
}

/// Upserts `records` in chunks of `cfg.upsert_batch`. Makes no call for an
/// empty slice.
pub async fn upsert_batched(
    cfg: &RagConfig,
    records: &[FaqRecord],
    index: &dyn RecordIndex,
) -> Result<IngestReport, RagError> {
    if records.is_empty() {
        debug!("no records to upsert");
        return Ok(IngestReport::default());
    }

    let batch_size = cfg.upsert_batch.max(1);
    let total_batches = records.len().div_ceil(batch_size);

    let pb = ProgressBar::new(total_batches as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );

    let mut report = IngestReport::default();
    for chunk in records.chunks(batch_size) {
        if let Err(e) = index.upsert_records(&cfg.namespace, chunk).await {
            pb.abandon();
            warn!(
                batch = report.batches + 1,
                total_batches,
                error = %e,
                "upsert batch failed"
            );
            return Err(e);
        }
        report.records += chunk.len();
        report.batches += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(report)
}

/// Logs the record count of the namespace; failures are only warned about.
pub async fn log_namespace_count(cfg: &RagConfig, index: &dyn RecordIndex) -> Option<u64> {
    match index.namespace_count(&cfg.namespace).await {
        Ok(n) => {
            info!(namespace = %cfg.namespace, records = n, "namespace record count");
            Some(n)
        }
        Err(e) => {
            warn!(namespace = %cfg.namespace, error = %e, "could not read namespace stats");
            None
        }
    }
}
