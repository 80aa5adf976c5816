//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for pipes and CI
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use yamldoctor::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.message("steps.yml: ok");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod prompts;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{BatchProgress, HiddenProgress};
pub use prompts::select_many;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, DoctorTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Write primary output (reports, documents, diffs). Shown in every mode.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Let the user pick any number of `items`; returns the chosen indices.
    fn select_many(&mut self, question: &str, items: &[String]) -> Result<Vec<usize>>;

    /// Start a progress indicator over `total` units of work.
    fn start_progress(&mut self, total: usize, label: &str) -> Box<dyn ProgressHandle>;

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for a running progress indicator.
///
/// `Sync` so parallel workers can tick it.
pub trait ProgressHandle: Send + Sync {
    /// Record one finished unit, naming it.
    fn tick(&self, item: &str);

    /// Remove the indicator.
    fn finish(&self);
}
