//! Human-readable output formatter.
//!
//! Formats validation messages for terminal display with optional color support.

use super::LintFormatter;
use crate::lint::{LintMessage, Severity, ValidationResult};
use console::style;
use std::io::Write;

/// Formats validation output for human consumption.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
}

impl HumanFormatter {
    /// Create a new human formatter.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn severity_prefix(&self, severity: Severity) -> String {
        let label = severity.to_string();
        if !self.use_color {
            return label;
        }
        match severity {
            Severity::Info => style(label).cyan().to_string(),
            Severity::Warning => style(label).yellow().bold().to_string(),
            Severity::Error => style(label).red().bold().to_string(),
        }
    }

    fn location(file: &str, msg: &LintMessage) -> String {
        match (msg.line, msg.column) {
            (Some(line), Some(col)) => format!("{}:{}:{}", file, line, col),
            (Some(line), None) => format!("{}:{}", file, line),
            _ => file.to_string(),
        }
    }
}

impl LintFormatter for HumanFormatter {
    fn format<W: Write>(
        &self,
        file: &str,
        result: &ValidationResult,
        writer: &mut W,
    ) -> std::io::Result<()> {
        for msg in &result.messages {
            // Header line: error[source/rule]: message
            let tag = match &msg.rule_id {
                Some(rule) => format!("{}/{}", msg.source, rule),
                None => msg.source.to_string(),
            };
            writeln!(
                writer,
                "{}[{}]: {}",
                self.severity_prefix(msg.severity),
                tag,
                msg.message
            )?;

            writeln!(writer, "  --> {}", Self::location(file, msg))?;

            if let Some(ref path) = msg.path {
                writeln!(writer, "   = at: {}", path)?;
            }

            if let Some(ref suggestion) = msg.suggestion {
                writeln!(writer, "   = help: {}", suggestion)?;
            }

            writeln!(writer)?;
        }

        let errors = result.count(Severity::Error);
        let warnings = result.count(Severity::Warning);

        if let Some(summary) = &result.provider_summary {
            writeln!(writer, "{}: validated as {}", file, summary.provider)?;
        }

        if errors > 0 || warnings > 0 {
            writeln!(
                writer,
                "Found {} error(s) and {} warning(s)",
                errors, warnings
            )?;
        } else if result.ok {
            writeln!(writer, "{}: ok", file)?;
        }

        Ok(())
    }
}
