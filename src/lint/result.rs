//! Aggregated validation results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::message::{LintMessage, Severity, Source};
use crate::detection::Dialect;

/// Per-severity tally for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl SeverityCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.infos += 1,
        }
    }
}

/// Summary of which dialect was validated and what each source reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Dialect the document was validated as.
    pub provider: Dialect,
    /// Spec and ruleset origins (path, `embedded`, or none).
    pub sources: BTreeMap<String, Option<String>>,
    /// Message tallies per source.
    pub counts: BTreeMap<Source, SeverityCounts>,
}

impl ProviderSummary {
    /// Build a summary by tallying the given messages.
    pub fn tally(
        provider: Dialect,
        sources: BTreeMap<String, Option<String>>,
        messages: &[LintMessage],
    ) -> Self {
        let mut counts: BTreeMap<Source, SeverityCounts> = BTreeMap::new();
        for msg in messages {
            counts.entry(msg.source).or_default().record(msg.severity);
        }
        Self {
            provider,
            sources,
            counts,
        }
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff no message has error severity.
    pub ok: bool,
    /// Messages in emission order.
    pub messages: Vec<LintMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_summary: Option<ProviderSummary>,
}

impl ValidationResult {
    /// Build a result, deriving `ok` from the messages.
    pub fn new(messages: Vec<LintMessage>, provider_summary: Option<ProviderSummary>) -> Self {
        let ok = !messages.iter().any(LintMessage::is_error);
        Self {
            ok,
            messages,
            provider_summary,
        }
    }

    /// Number of messages with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    /// Messages produced by one source, in emission order.
    pub fn from_source(&self, source: Source) -> impl Iterator<Item = &LintMessage> {
        self.messages.iter().filter(move |m| m.source == source)
    }
}
