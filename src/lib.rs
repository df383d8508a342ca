//! FAQ RAG application: configuration, telemetry, startup and the
//! interactive question loop. The binaries in this package are thin wrappers.

pub mod app;
pub mod config;
pub mod error;
pub mod repl;
pub mod telemetry;

pub use config::AppConfig;
pub use error::StartupError;
pub use repl::{Asker, ReplExit};
