//! General YAML style checks via `yamllint`.
//!
//! The local binary is tried first; when it cannot run, the same check is
//! retried once inside a network-disabled container.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use super::{malformed, unavailable, CheckInput, Checker};
use crate::error::Result;
use crate::lint::{LintMessage, MessageKind, Severity, Source};
use crate::shell::{RunOptions, RunOutput, ToolRunner, DEFAULT_PROCESS_TIMEOUT};

pub const DEFAULT_COMMAND: &str = "yamllint";
pub const DEFAULT_IMAGE: &str = "cytopia/yamllint:latest";

/// `stdin:3:1: [warning] missing document start "---" (document-start)`
static RE_PARSABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^:]*:(\d+):(\d+): \[(\w+)\] (.*?)(?: \(([\w-]+)\))?$").unwrap()
});

/// The `yamllint` checker.
#[derive(Debug, Clone)]
pub struct StyleChecker {
    command: String,
    container_runtime: String,
    image: String,
    config: Option<String>,
    timeout: Duration,
}

impl Default for StyleChecker {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            container_runtime: "docker".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            config: None,
            timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }
}

impl StyleChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_container(mut self, runtime: impl Into<String>, image: impl Into<String>) -> Self {
        self.container_runtime = runtime.into();
        self.image = image.into();
        self
    }

    /// yamllint configuration (`-d`), a file path or inline YAML.
    pub fn with_config(mut self, config: Option<String>) -> Self {
        self.config = config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments shared by the local and container invocations.
    pub fn lint_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), "parsable".to_string()];
        if let Some(config) = &self.config {
            args.push("-d".to_string());
            args.push(config.clone());
        }
        args.push("-".to_string());
        args
    }

    pub fn container_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["run", "--rm", "-i", "--network", "none"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(self.image.clone());
        args.extend(self.lint_args());
        args
    }

    fn invoke(&self, runner: &dyn ToolRunner, content: &str) -> RunOutput {
        let options = RunOptions::default()
            .with_input(content)
            .with_timeout(self.timeout);

        let local = runner.run(&self.command, &self.lint_args(), &options);
        if !local.could_not_run() {
            return local;
        }

        debug!(
            command = %self.command,
            exit_code = local.exit_code,
            "yamllint not runnable locally, trying container"
        );
        runner.run(&self.container_runtime, &self.container_args(), &options)
    }
}

/// Parse yamllint's parsable output.
pub fn parse_output(stdout: &str) -> Vec<LintMessage> {
    stdout
        .lines()
        .filter_map(|line| RE_PARSABLE.captures(line.trim_end()))
        .map(|caps| {
            let line: usize = caps[1].parse().unwrap_or(1);
            let column: Option<usize> = caps[2].parse().ok();
            let severity = match &caps[3] {
                "error" => Severity::Error,
                "warning" => Severity::Warning,
                _ => Severity::Info,
            };
            let msg = LintMessage::new(Source::StyleChecker, severity, &caps[4])
                .with_location(line, column)
                .with_kind(MessageKind::Style);
            match caps.get(5) {
                Some(rule) => msg.with_rule(rule.as_str()),
                None => msg,
            }
        })
        .collect()
}

impl Checker for StyleChecker {
    fn name(&self) -> &str {
        DEFAULT_COMMAND
    }

    fn source(&self) -> Source {
        Source::StyleChecker
    }

    fn skipped(&self) -> &'static str {
        "style checks"
    }

    fn check(&self, runner: &dyn ToolRunner, input: &CheckInput<'_>) -> Result<Vec<LintMessage>> {
        let output = self.invoke(runner, input.content);
        if output.could_not_run() {
            return Err(unavailable(self.name(), &output));
        }

        let messages = parse_output(&output.stdout);
        // 0 = clean, 1 = errors found, 2 = warnings under strict mode
        if messages.is_empty() && !matches!(output.exit_code, 0..=2) {
            return Err(malformed(
                self.name(),
                format!("exit code {} with no findings", output.exit_code),
            ));
        }
        Ok(messages)
    }
}
