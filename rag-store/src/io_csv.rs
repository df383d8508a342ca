//! FAQ CSV reading.
//!
//! Expects a header row with `questions` and `answers` columns (case-sensitive,
//! any extra columns are ignored). Rows are returned with their 0-based ordinal
//! so record ids stay stable even when malformed rows are skipped.

use std::{io::Read, path::Path};

use tracing::{debug, warn};

use crate::config::RowPolicy;
use crate::errors::RagError;
use crate::record::FaqRow;

/// Rows read from a CSV source, plus how many were dropped.
#[derive(Debug, Default)]
pub struct CsvRows {
    pub rows: Vec<(usize, FaqRow)>,
    pub skipped: usize,
}

/// Reads all FAQ rows from `path`.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be opened
/// - [`RagError::Csv`] on a malformed row under [`RowPolicy::Strict`]
pub fn read_faq_rows(path: impl AsRef<Path>, policy: RowPolicy) -> Result<CsvRows, RagError> {
    let path = path.as_ref();
    debug!(path = %path.display(), ?policy, "reading FAQ CSV");
    let file = std::fs::File::open(path)?;
    read_faq_rows_from(file, policy)
}

/// Same as [`read_faq_rows`], for any reader.
pub fn read_faq_rows_from<R: Read>(reader: R, policy: RowPolicy) -> Result<CsvRows, RagError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut out = CsvRows::default();
    for (ordinal, row) in rdr.deserialize::<FaqRow>().enumerate() {
        match row {
            Ok(row) => out.rows.push((ordinal, row)),
            Err(e) if policy == RowPolicy::SkipMalformed && !e.is_io_error() => {
                warn!(row = ordinal, error = %e, "skipping malformed FAQ row");
                out.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(rows = out.rows.len(), skipped = out.skipped, "FAQ CSV read");
    Ok(out)
}
