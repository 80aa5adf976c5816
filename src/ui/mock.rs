//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use yamldoctor::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("steps.yml: ok");
//! assert!(ui.has_message("ok"));
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{DoctorError, Result};

use super::{OutputMode, ProgressHandle, UserInterface};

/// Captures every interaction. Selections are answered from a queue.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    selections: VecDeque<Vec<usize>>,
    prompts_shown: Vec<(String, Vec<String>)>,
    ticks: Arc<AtomicUsize>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Queue the answer to the next selection prompt. Makes the UI interactive.
    pub fn queue_selection(&mut self, indices: Vec<usize>) {
        self.interactive = true;
        self.selections.push_back(indices);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Prompts shown, with the items offered.
    pub fn prompts_shown(&self) -> &[(String, Vec<String>)] {
        &self.prompts_shown
    }

    /// Progress ticks recorded across all progress handles.
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    /// All primary output joined by newlines.
    pub fn output(&self) -> String {
        self.messages.join("\n")
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

struct MockProgress {
    ticks: Arc<AtomicUsize>,
}

impl ProgressHandle for MockProgress {
    fn tick(&self, _item: &str) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {}
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn select_many(&mut self, question: &str, items: &[String]) -> Result<Vec<usize>> {
        self.prompts_shown
            .push((question.to_string(), items.to_vec()));
        self.selections
            .pop_front()
            .ok_or_else(|| DoctorError::InvalidInput {
                message: format!("no scripted answer for '{}'", question),
            })
    }

    fn start_progress(&mut self, _total: usize, _label: &str) -> Box<dyn ProgressHandle> {
        Box::new(MockProgress {
            ticks: Arc::clone(&self.ticks),
        })
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
