//! Lint messages.
//!
//! This module provides [`LintMessage`], the single unit every checker,
//! the preflight guard, the parser and the suggestion engines report in,
//! along with its classification enums:
//!
//! - [`Source`] - Which stage produced the message
//! - [`Severity`] - Info, Warning or Error
//! - [`MessageKind`] - Syntax, Semantic or Style

use serde::{Deserialize, Serialize};

/// The stage that produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// General YAML style checker (yamllint).
    StyleChecker,
    /// Deep semantic checker for infrastructure templates (cfn-lint).
    TemplateChecker,
    /// Declarative ruleset checker (spectral).
    RulesChecker,
    /// Preflight guard and YAML parser.
    Parser,
    /// Built-in dialect suggestion engines.
    DialectSchema,
}

impl Source {
    /// All sources, in reporting order.
    pub const ALL: [Source; 5] = [
        Source::Parser,
        Source::StyleChecker,
        Source::TemplateChecker,
        Source::DialectSchema,
        Source::RulesChecker,
    ];

    /// Stable kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::StyleChecker => "style-checker",
            Source::TemplateChecker => "template-checker",
            Source::RulesChecker => "rules-checker",
            Source::Parser => "parser",
            Source::DialectSchema => "dialect-schema",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level for lint messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never affects validity.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that makes the document invalid.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Broad category of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Syntax,
    Semantic,
    Style,
}

/// A message produced by one validation stage.
///
/// Messages are built once with the `with_*` methods and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    /// The stage that produced this message.
    pub source: Source,
    /// Severity of this message.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Document pointer (`Resources.B.Type`, `steps[0].script`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 1-based line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Identifier of the rule that fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    /// Optional suggestion for fixing the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl LintMessage {
    /// Create a new message.
    pub fn new(source: Source, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            source,
            severity,
            message: message.into(),
            path: None,
            line: None,
            column: None,
            rule_id: None,
            kind: None,
            suggestion: None,
        }
    }

    /// Shorthand for an error-severity message.
    pub fn error(source: Source, message: impl Into<String>) -> Self {
        Self::new(source, Severity::Error, message)
    }

    /// Shorthand for a warning-severity message.
    pub fn warning(source: Source, message: impl Into<String>) -> Self {
        Self::new(source, Severity::Warning, message)
    }

    /// Shorthand for an info-severity message.
    pub fn info(source: Source, message: impl Into<String>) -> Self {
        Self::new(source, Severity::Info, message)
    }

    /// Attach a document pointer.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a line and optional column.
    pub fn with_location(mut self, line: usize, column: Option<usize>) -> Self {
        self.line = Some(line);
        self.column = column;
        self
    }

    /// Attach the identifier of the rule that fired.
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Add a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Whether this message makes a document invalid.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_creation() {
        let msg = LintMessage::new(Source::Parser, Severity::Error, "Test message");

        assert_eq!(msg.source, Source::Parser);
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.message, "Test message");
        assert!(msg.path.is_none());
        assert!(msg.line.is_none());
        assert!(msg.suggestion.is_none());
    }

    #[test]
    fn message_builder_pattern() {
        let msg = LintMessage::warning(Source::DialectSchema, "Unknown property")
            .with_path("Resources.B.Properties.BucketNam")
            .with_location(4, Some(7))
            .with_rule("unknown-property")
            .with_kind(MessageKind::Semantic)
            .with_suggestion("Did you mean 'BucketName'?");

        assert_eq!(msg.path.as_deref(), Some("Resources.B.Properties.BucketNam"));
        assert_eq!(msg.line, Some(4));
        assert_eq!(msg.column, Some(7));
        assert_eq!(msg.rule_id.as_deref(), Some("unknown-property"));
        assert_eq!(msg.kind, Some(MessageKind::Semantic));
        assert!(!msg.is_error());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Info), "info");
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Error), "error");
    }

    #[test]
    fn source_serializes_kebab_case() {
        let json = serde_json::to_string(&Source::StyleChecker).unwrap();
        assert_eq!(json, "\"style-checker\"");
        assert_eq!(Source::DialectSchema.to_string(), "dialect-schema");
    }

    #[test]
    fn message_serializes_camel_case_and_skips_empty_fields() {
        let msg = LintMessage::error(Source::TemplateChecker, "bad").with_rule("E3012");
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["ruleId"], "E3012");
        assert_eq!(value["source"], "template-checker");
        assert!(value.get("line").is_none());
    }
}
