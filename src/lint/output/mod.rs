//! Lint output formatters.
//!
//! This module provides formatters for writing validation results
//! in different formats (human-readable, JSON).

pub mod human;
pub mod json;

use crate::lint::ValidationResult;
use std::io::Write;

/// Output format for validation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting validation output.
pub trait LintFormatter {
    /// Format the result for `file` to the given writer.
    fn format<W: Write>(
        &self,
        file: &str,
        result: &ValidationResult,
        writer: &mut W,
    ) -> std::io::Result<()>;
}

pub use human::HumanFormatter;
pub use json::JsonFormatter;
