use crate::models::SourceFile;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Per-stage progress over the source files of a run.
///
/// A silent reporter does nothing, which keeps tests and piped output clean.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(total: u64, stage: &str, silent: bool) -> Self {
        if silent {
            return Self { progress_bar: None };
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{prefix:>8} {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_prefix(stage.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn silent() -> Self {
        Self { progress_bar: None }
    }

    /// Show which source is being worked on.
    pub fn start(&self, source: &SourceFile) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(source.file_name());
        }
    }

    pub fn advance(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
