//! Batch progress display.

use indicatif::{ProgressBar, ProgressStyle};

use super::ProgressHandle;

/// A progress bar over a known number of files.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total: usize, label: &str) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template("{prefix} [{bar:30}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    /// A bar that never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressHandle for BatchProgress {
    fn tick(&self, item: &str) {
        self.bar.set_message(item.to_string());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Progress handle for non-terminal output.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenProgress;

impl ProgressHandle for HiddenProgress {
    fn tick(&self, _item: &str) {}

    fn finish(&self) {}
}
