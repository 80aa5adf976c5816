//! Dialect-aware repair suggestions.
//!
//! An engine ([`Suggester`]) walks a parsed document against its dialect's
//! spec and returns an [`Analysis`]: suggestions (each optionally carrying
//! an [`EditOp`] fix) plus the matching `dialect-schema` messages.
//! Suggestions are addressed by their index in one analysis; applying fixes
//! always re-analyzes the content so indices line up with what the caller
//! was shown.

pub mod edit;
pub mod fuzzy;
pub mod pipeline;
pub mod template;

use serde::Serialize;
use tracing::debug;

use crate::diff::{DiffOutput, DiffProducer};
use crate::document::{to_yaml_string, DocPath, Document};
use crate::error::Result;
use crate::lint::{LintMessage, MessageKind, Severity, Source};
use crate::parser::BoundedParser;
use crate::security::{ensure_safe, GuardOptions};

pub use edit::{apply, EditError, EditOp};
pub use fuzzy::{closest, levenshtein};
pub use pipeline::PipelineSuggester;
pub use template::TemplateSuggester;

/// What a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A required field is missing.
    Add,
    /// A key or type name is unknown; a close match exists.
    Rename,
    /// A value has the wrong type.
    Type,
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SuggestionKind::Add => "add",
            SuggestionKind::Rename => "rename",
            SuggestionKind::Type => "type",
        })
    }
}

/// One proposed repair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub path: String,
    pub message: String,
    pub kind: SuggestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<EditOp>,
}

impl Suggestion {
    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }
}

/// Result of analysing one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub suggestions: Vec<Suggestion>,
    pub messages: Vec<LintMessage>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.messages.is_empty()
    }

    /// Record a finding with no suggestion.
    pub(crate) fn report(
        &mut self,
        severity: Severity,
        rule: &str,
        path: &DocPath,
        message: impl Into<String>,
    ) {
        self.messages.push(
            LintMessage::new(Source::DialectSchema, severity, message)
                .with_path(path.to_string())
                .with_rule(rule)
                .with_kind(MessageKind::Semantic),
        );
    }

    /// Record a finding together with the suggestion that addresses it.
    pub(crate) fn suggest(
        &mut self,
        severity: Severity,
        rule: &str,
        kind: SuggestionKind,
        path: &DocPath,
        message: impl Into<String>,
        fix: Option<EditOp>,
    ) {
        let message = message.into();
        let mut lint = LintMessage::new(Source::DialectSchema, severity, message.clone())
            .with_path(path.to_string())
            .with_rule(rule)
            .with_kind(MessageKind::Semantic);
        if let Some(op) = &fix {
            lint = lint.with_suggestion(op.to_string());
        }
        self.messages.push(lint);
        self.suggestions.push(Suggestion {
            path: path.to_string(),
            message,
            kind,
            fix,
        });
    }
}

/// A dialect engine.
pub trait Suggester: Send + Sync {
    fn analyze(&self, doc: &Document) -> Analysis;
}

/// Engine for documents with no dialect rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericSuggester;

impl Suggester for GenericSuggester {
    fn analyze(&self, _doc: &Document) -> Analysis {
        Analysis::default()
    }
}

/// A selected suggestion that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFix {
    pub index: usize,
    pub reason: String,
}

/// Outcome of applying selected suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFixes {
    pub content: String,
    pub applied: Vec<usize>,
    pub skipped: Vec<SkippedFix>,
}

impl AppliedFixes {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// A fix result together with its diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixPreview {
    pub fixes: AppliedFixes,
    pub diff: DiffOutput,
}

/// Apply the suggestions at `indices` (in that order) to `content`.
///
/// Indices refer to a fresh analysis of `content`. Out-of-range indices,
/// suggestions without a fix and edits that fail are skipped. When nothing
/// is applied the content comes back untouched.
///
/// The content passes the preflight guard with default options first.
pub fn apply_suggestions(
    suggester: &dyn Suggester,
    content: &str,
    indices: &[usize],
) -> Result<AppliedFixes> {
    apply_suggestions_with(
        &BoundedParser::default(),
        &GuardOptions::default(),
        suggester,
        content,
        indices,
    )
}

/// [`apply_suggestions`] with an explicit parser and guard options.
pub fn apply_suggestions_with(
    parser: &BoundedParser,
    guard: &GuardOptions,
    suggester: &dyn Suggester,
    content: &str,
    indices: &[usize],
) -> Result<AppliedFixes> {
    ensure_safe(content, guard)?;
    let mut doc = parser.parse(content)?;
    let analysis = suggester.analyze(&doc);

    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for &index in indices {
        let Some(suggestion) = analysis.suggestions.get(index) else {
            skipped.push(SkippedFix {
                index,
                reason: format!(
                    "no suggestion {} ({} available)",
                    index,
                    analysis.suggestions.len()
                ),
            });
            continue;
        };
        let Some(op) = &suggestion.fix else {
            skipped.push(SkippedFix {
                index,
                reason: "suggestion has no automatic fix".to_string(),
            });
            continue;
        };
        match apply(&mut doc, op) {
            Ok(()) => {
                debug!(index, %op, "Applied fix");
                applied.push(index);
            }
            Err(e) => skipped.push(SkippedFix {
                index,
                reason: e.to_string(),
            }),
        }
    }

    let content = if applied.is_empty() {
        content.to_string()
    } else {
        to_yaml_string(&doc)
    };

    Ok(AppliedFixes {
        content,
        applied,
        skipped,
    })
}

/// Apply suggestions and diff the result against the original.
pub fn preview_suggestions(
    suggester: &dyn Suggester,
    content: &str,
    indices: &[usize],
    differ: &dyn DiffProducer,
) -> Result<FixPreview> {
    let fixes = apply_suggestions(suggester, content, indices)?;
    let diff = differ.diff(content, &fixes.content);
    Ok(FixPreview { fixes, diff })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::UnifiedDiff;
    use crate::parser::parse_document;
    use crate::specs::{embedded, StepSchema};
    use std::sync::Arc;

    fn pipeline() -> PipelineSuggester {
        PipelineSuggester::new(Arc::new(embedded::<StepSchema>()))
    }

    #[test]
    fn applies_rename_fix() {
        let out = apply_suggestions(&pipeline(), "steps:\n  - srcipt: echo hi\n", &[0]).unwrap();
        assert_eq!(out.content, "steps:\n  - script: echo hi\n");
        assert_eq!(out.applied, vec![0]);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let content = "steps:\n- srcipt: echo hi   # typo\n";
        let out = apply_suggestions(&pipeline(), content, &[]).unwrap();
        assert_eq!(out.content, content);
        assert!(!out.changed());
        assert_eq!(
            parse_document(&out.content).unwrap(),
            parse_document(content).unwrap()
        );
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let out = apply_suggestions(&pipeline(), "steps:\n  - srcipt: echo hi\n", &[7, 0]).unwrap();
        assert_eq!(out.applied, vec![0]);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].index, 7);
    }

    #[test]
    fn repeated_index_fails_second_time() {
        let out = apply_suggestions(&pipeline(), "steps:\n  - srcipt: echo hi\n", &[0, 0]).unwrap();
        assert_eq!(out.applied, vec![0]);
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn malformed_content_is_an_error() {
        assert!(apply_suggestions(&pipeline(), "foo: [1\n", &[0]).is_err());
    }

    #[test]
    fn guard_runs_before_parsing() {
        let content = "base: &b\n  a: 1\nsteps:\n  - srcipt: echo hi\n";
        let err = apply_suggestions(&pipeline(), content, &[0]).unwrap_err();
        assert!(matches!(err, crate::error::DoctorError::SecurityRejected { .. }));

        let relaxed = GuardOptions {
            allow_anchors: true,
            ..GuardOptions::default()
        };
        let out =
            apply_suggestions_with(&BoundedParser::default(), &relaxed, &pipeline(), content, &[0])
                .unwrap();
        assert_eq!(out.applied, vec![0]);
    }

    #[test]
    fn generic_engine_suggests_nothing() {
        let doc = parse_document("name: app\n").unwrap();
        assert!(GenericSuggester.analyze(&doc).is_empty());
    }

    #[test]
    fn preview_includes_diff() {
        let preview = preview_suggestions(
            &pipeline(),
            "steps:\n  - srcipt: echo hi\n",
            &[0],
            &UnifiedDiff::new(),
        )
        .unwrap();
        assert!(preview.diff.unified.contains("+  - script: echo hi"));
        assert_eq!(preview.diff.after, preview.fixes.content);
    }

    #[test]
    fn suggestion_serializes_kind_lowercase() {
        let s = Suggestion {
            path: "a".into(),
            message: "m".into(),
            kind: SuggestionKind::Rename,
            fix: None,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["kind"], "rename");
        assert!(json.get("fix").is_none());
    }
}
