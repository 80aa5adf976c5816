//! Custom ruleset checks via `spectral`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::{json_path, malformed, unavailable, CheckInput, Checker};
use crate::error::Result;
use crate::lint::{LintMessage, MessageKind, Severity, Source};
use crate::shell::{RunOptions, ToolRunner, DEFAULT_PROCESS_TIMEOUT};

pub const DEFAULT_COMMAND: &str = "spectral";

#[derive(Debug, Deserialize)]
struct Finding {
    code: Option<serde_json::Value>,
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
    severity: Option<i64>,
    range: Option<Range>,
}

#[derive(Debug, Deserialize)]
struct Range {
    start: Position,
}

#[derive(Debug, Deserialize)]
struct Position {
    line: usize,
    character: Option<usize>,
}

/// The `spectral` checker, bound to one ruleset file.
#[derive(Debug, Clone)]
pub struct RulesChecker {
    command: String,
    ruleset: PathBuf,
    timeout: Duration,
}

impl RulesChecker {
    pub fn new(ruleset: impl Into<PathBuf>) -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            ruleset: ruleset.into(),
            timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ruleset(&self) -> &Path {
        &self.ruleset
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "lint".to_string(),
            "--ruleset".to_string(),
            self.ruleset.display().to_string(),
            "--format".to_string(),
            "json".to_string(),
            "--quiet".to_string(),
        ]
    }
}

fn severity_from(level: Option<i64>) -> Severity {
    match level {
        Some(0) => Severity::Error,
        Some(1) => Severity::Warning,
        _ => Severity::Info,
    }
}

/// Parse spectral's JSON findings. Ranges are 0-based; messages are 1-based.
pub fn parse_output(stdout: &str) -> std::result::Result<Vec<LintMessage>, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let findings: Vec<Finding> = serde_json::from_str(stdout)?;
    Ok(findings
        .into_iter()
        .map(|f| {
            let mut msg = LintMessage::new(Source::RulesChecker, severity_from(f.severity), f.message)
                .with_kind(MessageKind::Semantic);
            match f.code {
                Some(serde_json::Value::String(code)) => msg = msg.with_rule(code),
                Some(serde_json::Value::Number(code)) => msg = msg.with_rule(code.to_string()),
                _ => {}
            }
            if let Some(range) = f.range {
                msg = msg.with_location(range.start.line + 1, range.start.character.map(|c| c + 1));
            }
            if let Some(path) = json_path(&f.path) {
                msg = msg.with_path(path);
            }
            msg
        })
        .collect())
}

impl Checker for RulesChecker {
    fn name(&self) -> &str {
        DEFAULT_COMMAND
    }

    fn source(&self) -> Source {
        Source::RulesChecker
    }

    fn skipped(&self) -> &'static str {
        "custom rules"
    }

    fn check(&self, runner: &dyn ToolRunner, input: &CheckInput<'_>) -> Result<Vec<LintMessage>> {
        let options = RunOptions::default()
            .with_input(input.content)
            .with_timeout(self.timeout);
        let output = runner.run(&self.command, &self.args(), &options);
        if output.could_not_run() {
            return Err(unavailable(self.name(), &output));
        }
        parse_output(&output.stdout).map_err(|e| malformed(self.name(), e.to_string()))
    }
}
