//! JSON output formatter.
//!
//! Formats validation results as machine-readable JSON for tooling integration.

use super::LintFormatter;
use crate::lint::{LintMessage, ProviderSummary, Severity, ValidationResult};
use serde::Serialize;
use std::io::Write;

/// Formats validation output as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    file: &'a str,
    ok: bool,
    messages: &'a [LintMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_summary: Option<&'a ProviderSummary>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }

    /// Build the JSON value for one file, used for batch output.
    pub fn to_value(&self, file: &str, result: &ValidationResult) -> serde_json::Value {
        serde_json::to_value(Self::output(file, result)).unwrap_or(serde_json::Value::Null)
    }

    fn output<'a>(file: &'a str, result: &'a ValidationResult) -> JsonOutput<'a> {
        JsonOutput {
            file,
            ok: result.ok,
            messages: &result.messages,
            provider_summary: result.provider_summary.as_ref(),
            summary: JsonSummary {
                total: result.messages.len(),
                errors: result.count(Severity::Error),
                warnings: result.count(Severity::Warning),
                infos: result.count(Severity::Info),
            },
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LintFormatter for JsonFormatter {
    fn format<W: Write>(
        &self,
        file: &str,
        result: &ValidationResult,
        writer: &mut W,
    ) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &Self::output(file, result))
            .map_err(std::io::Error::other)?;
        writeln!(writer)?;

        Ok(())
    }
}
