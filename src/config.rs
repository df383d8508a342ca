//! Application configuration resolved once at startup.
//!
//! # Environment variables
//!
//! - `PINECONE_API_KEY` (required)
//! - `GEMINI_API_KEY` (required; legacy alias `GEMINI_API_KEYS`)
//! - `FAQ_DATA_DIR` (optional, default `./data`)
//! - `FAQ_SKIP_MALFORMED_ROWS` (optional bool, default `false`)

use std::path::{Path, PathBuf};

use ai_llm_service::error_handler::{env_opt_bool, must_env};
use ai_llm_service::{LlmModelConfig, config_gemini_default};
use rag_store::{RagConfig, RowPolicy};
use tracing::{debug, info};

use crate::error::StartupError;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const FAQ_CSV_FILE: &str = "faqs.csv";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub csv_path: PathBuf,
    pub rag: RagConfig,
    pub llm: LlmModelConfig,
}

impl AppConfig {
    /// Reads the environment and validates both service configs.
    ///
    /// The data directory is created and the CSV located first, so a missing
    /// file is reported with its path even when credentials are also absent.
    pub fn from_env() -> Result<Self, StartupError> {
        let (data_dir, _) = prepare_data_dir(std::env::var("FAQ_DATA_DIR").ok().as_deref())?;

        let pinecone_key = must_env("PINECONE_API_KEY")?;
        let llm = config_gemini_default()?;
        let skip_rows = env_opt_bool("FAQ_SKIP_MALFORMED_ROWS")?.unwrap_or(false);

        Self::build(data_dir, pinecone_key, llm, skip_rows)
    }

    /// Assembles the config from already-resolved parts.
    pub fn build(
        data_dir: PathBuf,
        pinecone_key: String,
        llm: LlmModelConfig,
        skip_malformed_rows: bool,
    ) -> Result<Self, StartupError> {
        let policy = if skip_malformed_rows {
            RowPolicy::SkipMalformed
        } else {
            RowPolicy::Strict
        };
        let rag = RagConfig::faq_default(pinecone_key).with_row_policy(policy);
        rag.validate().map_err(StartupError::Store)?;
        llm.validate()?;

        ensure_data_dir(&data_dir)?;
        let csv_path = data_dir.join(FAQ_CSV_FILE);

        info!(
            data_dir = %data_dir.display(),
            index = %rag.index_name,
            namespace = %rag.namespace,
            model = %llm.model,
            row_policy = ?rag.row_policy,
            "configuration loaded"
        );

        Ok(Self {
            data_dir,
            csv_path,
            rag,
            llm,
        })
    }
}

/// `FAQ_DATA_DIR` when set and non-empty, otherwise `./data`.
pub fn resolve_data_dir(from_env: Option<&str>) -> PathBuf {
    match from_env.map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}

/// Resolves and creates the data directory, then checks the FAQ CSV is there.
///
/// # Errors
/// [`StartupError::CsvMissing`] naming the expected path.
pub fn prepare_data_dir(from_env: Option<&str>) -> Result<(PathBuf, PathBuf), StartupError> {
    let data_dir = resolve_data_dir(from_env);
    ensure_data_dir(&data_dir)?;
    let csv_path = data_dir.join(FAQ_CSV_FILE);
    if !csv_path.is_file() {
        return Err(StartupError::CsvMissing(csv_path));
    }
    Ok((data_dir, csv_path))
}

pub fn ensure_data_dir(dir: &Path) -> Result<(), StartupError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "creating data directory");
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::config_gemini_with_key;

    #[test]
    fn data_dir_defaults_and_override() {
        assert_eq!(resolve_data_dir(None), PathBuf::from("data"));
        assert_eq!(resolve_data_dir(Some("  ")), PathBuf::from("data"));
        assert_eq!(resolve_data_dir(Some("/srv/faq")), PathBuf::from("/srv/faq"));
    }

    #[test]
    fn build_creates_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("data");

        let cfg = AppConfig::build(dir.clone(), "pc".into(), config_gemini_with_key("g"), true)
            .unwrap();
        assert!(dir.is_dir());
        assert_eq!(cfg.csv_path, dir.join("faqs.csv"));
        assert_eq!(cfg.rag.row_policy, RowPolicy::SkipMalformed);
    }

    #[test]
    fn missing_csv_is_reported_after_creating_the_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("fresh");

        let err = prepare_data_dir(dir.to_str()).unwrap_err();
        assert!(dir.is_dir());
        let expected = dir.join("faqs.csv");
        assert!(matches!(err, StartupError::CsvMissing(ref p) if p == &expected));
        assert!(err.user_message().contains(&expected.display().to_string()));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn present_csv_is_located() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("faqs.csv"), "questions,answers
").unwrap();

        let (dir, csv) = prepare_data_dir(tmp.path().to_str()).unwrap();
        assert_eq!(dir, tmp.path().to_path_buf());
        assert_eq!(csv, tmp.path().join("faqs.csv"));
    }

    #[test]
    fn blank_pinecone_key_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = AppConfig::build(
            tmp.path().to_path_buf(),
            " ".into(),
            config_gemini_with_key("g"),
            false,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
