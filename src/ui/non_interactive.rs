//! Non-interactive UI for pipes and CI.

use crate::error::{DoctorError, Result};

use super::{HiddenProgress, OutputMode, ProgressHandle, UserInterface};

/// Plain-text UI with no prompts and no progress bars.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn select_many(&mut self, question: &str, _items: &[String]) -> Result<Vec<usize>> {
        Err(DoctorError::InvalidInput {
            message: format!("'{}' needs an interactive terminal; use --select or --all", question),
        })
    }

    fn start_progress(&mut self, _total: usize, _label: &str) -> Box<dyn ProgressHandle> {
        Box::new(HiddenProgress)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
