//! Lightweight progress reporting for a single question.
//!
//! `NoopProgress` for headless runs and tests, `IndicatifProgress` for a TTY.
//! Bars draw to stderr and are cleared when finished, so stdout only carries
//! the answer frame.

use indicatif::{ProgressBar, ProgressStyle};

/// Minimal progress interface used inside [`crate::FaqAnswerer::ask_with_progress`].
pub trait Progress: Send + Sync {
    /// Advance by one step and show a short message.
    fn step(&self, _msg: &str) {}
    /// Replace current message without advancing.
    fn message(&self, _msg: &str) {}
    /// Finish the UI.
    fn finish(&self, _msg: &str) {}
}

/// No-op reporter.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Indicatif-based spinner.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    /// Spinner (unknown total).
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/ "),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn step(&self, msg: &str) {
        self.pb.inc(1);
        self.pb.set_message(msg.to_string());
    }
    fn message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }
    fn finish(&self, _msg: &str) {
        self.pb.finish_and_clear();
    }
}

impl Drop for IndicatifProgress {
    /// A turn cancelled mid-flight never reaches `finish`; clear the line anyway.
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}
