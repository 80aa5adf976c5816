//! External checkers.
//!
//! Each checker wraps one third-party tool invoked through a
//! [`ToolRunner`]. A checker reports failure as a [`DoctorError`];
//! [`run_checker`] turns those failures into a single degraded message so
//! one missing tool never fails a whole validation:
//!
//! - tool could not run: one `info`
//! - tool output unreadable: one `warning` ("failed to parse checker output")

pub mod declarative;
pub mod style;
pub mod template_rules;

use std::path::Path;

use tracing::warn;

use crate::error::{DoctorError, Result};
use crate::lint::{LintMessage, Source};
use crate::shell::{RunOutput, ToolRunner};

pub use declarative::RulesChecker;
pub use style::StyleChecker;
pub use template_rules::TemplateRulesChecker;

/// Message text for unreadable checker output.
pub const MALFORMED_OUTPUT: &str = "failed to parse checker output";

/// What a checker gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    pub content: &'a str,
    pub source_path: Option<&'a Path>,
}

impl<'a> CheckInput<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            source_path: None,
        }
    }

    pub fn with_path(mut self, path: Option<&'a Path>) -> Self {
        self.source_path = path;
        self
    }
}

/// An external tool that produces lint messages.
pub trait Checker {
    /// Tool name (e.g. `yamllint`).
    fn name(&self) -> &str;

    /// Source attributed to this checker's messages.
    fn source(&self) -> Source;

    /// What is lost when the tool is unavailable (e.g. "style checks").
    fn skipped(&self) -> &'static str;

    /// Run the tool and translate its findings.
    fn check(&self, runner: &dyn ToolRunner, input: &CheckInput<'_>) -> Result<Vec<LintMessage>>;
}

/// Run `checker`, degrading failures to one message.
pub fn run_checker(
    checker: &dyn Checker,
    runner: &dyn ToolRunner,
    input: &CheckInput<'_>,
) -> Vec<LintMessage> {
    match checker.check(runner, input) {
        Ok(messages) => messages,
        Err(e) => {
            warn!(checker = checker.name(), "{}", e);
            vec![degraded_message(checker, &e)]
        }
    }
}

fn degraded_message(checker: &dyn Checker, err: &DoctorError) -> LintMessage {
    match err {
        DoctorError::CheckerOutputMalformed { .. } => {
            LintMessage::warning(checker.source(), MALFORMED_OUTPUT)
                .with_rule(format!("{}/output", checker.name()))
        }
        _ => LintMessage::info(
            checker.source(),
            format!("{} unavailable; {} skipped", checker.name(), checker.skipped()),
        )
        .with_rule(format!("{}/unavailable", checker.name())),
    }
}

pub(crate) fn unavailable(checker: &str, output: &RunOutput) -> DoctorError {
    DoctorError::CheckerUnavailable {
        checker: checker.to_string(),
        message: first_line(&output.stderr)
            .unwrap_or_else(|| format!("exit code {}", output.exit_code)),
    }
}

pub(crate) fn malformed(checker: &str, message: impl Into<String>) -> DoctorError {
    DoctorError::CheckerOutputMalformed {
        checker: checker.to_string(),
        message: message.into(),
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Render a JSON path array (`["Resources", "B", 0]`) as a dotted path.
pub(crate) fn json_path(segments: &[serde_json::Value]) -> Option<String> {
    use crate::document::DocPath;

    if segments.is_empty() {
        return None;
    }
    let mut path = DocPath::root();
    for segment in segments {
        path = match segment {
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(i) => path.index(i as usize),
                None => path.key(n.to_string()),
            },
            serde_json::Value::String(s) => path.key(s.clone()),
            other => path.key(other.to_string()),
        };
    }
    Some(path.to_string())
}
