//! Deep template checks via `cfn-lint` in a container.
//!
//! cfn-lint reads a file, not stdin, so the checker needs the document's
//! path. The file's directory is mounted read-only and the container has no
//! network.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::{json_path, malformed, unavailable, CheckInput, Checker};
use crate::error::{DoctorError, Result};
use crate::lint::{LintMessage, MessageKind, Severity, Source};
use crate::shell::{RunOptions, ToolRunner, DEFAULT_PROCESS_TIMEOUT};

pub const DEFAULT_IMAGE: &str = "public.ecr.aws/aws-cloudformation/cfn-lint:latest";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Finding {
    level: Option<String>,
    message: String,
    rule: Option<FindingRule>,
    location: Option<FindingLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FindingRule {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FindingLocation {
    start: Option<FindingPosition>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FindingPosition {
    line_number: Option<usize>,
    column_number: Option<usize>,
}

/// The `cfn-lint` checker.
#[derive(Debug, Clone)]
pub struct TemplateRulesChecker {
    container_runtime: String,
    image: String,
    timeout: Duration,
}

impl Default for TemplateRulesChecker {
    fn default() -> Self {
        Self {
            container_runtime: "docker".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }
}

impl TemplateRulesChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, runtime: impl Into<String>, image: impl Into<String>) -> Self {
        self.container_runtime = runtime.into();
        self.image = image.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Container arguments for linting `path`.
    pub fn container_args(&self, path: &Path) -> Result<Vec<String>> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let dir = absolute.parent().ok_or_else(|| DoctorError::InvalidInput {
            message: format!("{} has no parent directory", path.display()),
        })?;
        let file = absolute
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| DoctorError::InvalidInput {
                message: format!("{} has no usable file name", path.display()),
            })?;

        Ok(vec![
            "run".to_string(),
            "--rm".to_string(),
            "--network".to_string(),
            "none".to_string(),
            "-v".to_string(),
            format!("{}:/data:ro", dir.display()),
            "-w".to_string(),
            "/data".to_string(),
            self.image.clone(),
            "--format".to_string(),
            "json".to_string(),
            file.to_string(),
        ])
    }
}

/// Parse cfn-lint's JSON findings.
pub fn parse_output(stdout: &str) -> std::result::Result<Vec<LintMessage>, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let findings: Vec<Finding> = serde_json::from_str(stdout)?;
    Ok(findings.into_iter().map(finding_to_message).collect())
}

fn finding_to_message(finding: Finding) -> LintMessage {
    let severity = match finding.level.as_deref() {
        Some("Error") => Severity::Error,
        Some("Warning") => Severity::Warning,
        _ => Severity::Info,
    };
    let mut msg = LintMessage::new(Source::TemplateChecker, severity, finding.message)
        .with_kind(MessageKind::Semantic);

    if let Some(id) = finding.rule.and_then(|r| r.id) {
        msg = msg.with_rule(id);
    }
    if let Some(location) = finding.location {
        if let Some(line) = location.start.as_ref().and_then(|s| s.line_number) {
            let column = location.start.as_ref().and_then(|s| s.column_number);
            msg = msg.with_location(line, column);
        }
        if let Some(path) = json_path(&location.path) {
            msg = msg.with_path(path);
        }
    }
    msg
}

impl Checker for TemplateRulesChecker {
    fn name(&self) -> &str {
        "cfn-lint"
    }

    fn source(&self) -> Source {
        Source::TemplateChecker
    }

    fn skipped(&self) -> &'static str {
        "template rule checks"
    }

    fn check(&self, runner: &dyn ToolRunner, input: &CheckInput<'_>) -> Result<Vec<LintMessage>> {
        let Some(path) = input.source_path else {
            return Ok(Vec::new());
        };

        let args = self.container_args(path)?;
        let options = RunOptions::default().with_timeout(self.timeout);
        let output = runner.run(&self.container_runtime, &args, &options);
        if output.could_not_run() {
            return Err(unavailable(self.name(), &output));
        }

        parse_output(&output.stdout).map_err(|e| malformed(self.name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::{run_checker, MALFORMED_OUTPUT};
    use crate::shell::{FakeRunner, RunOutput};

    const FINDINGS: &str = r#"[
      {
        "Filename": "template.yml",
        "Level": "Error",
        "Message": "Property Resources/B/Properties/BucketNme is not allowed",
        "Rule": {"Id": "E3002", "Description": "Resource properties are invalid"},
        "Location": {
          "Start": {"LineNumber": 5, "ColumnNumber": 7},
          "End": {"LineNumber": 5, "ColumnNumber": 16},
          "Path": ["Resources", "B", "Properties", "BucketNme"]
        }
      },
      {"Level": "Informational", "Message": "note", "Rule": {"Id": "I1001"}}
    ]"#;

    #[test]
    fn maps_findings() {
        let msgs = parse_output(FINDINGS).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].severity, Severity::Error);
        assert_eq!(msgs[0].rule_id.as_deref(), Some("E3002"));
        assert_eq!(msgs[0].line, Some(5));
        assert_eq!(msgs[0].column, Some(7));
        assert_eq!(msgs[0].path.as_deref(), Some("Resources.B.Properties.BucketNme"));
        assert_eq!(msgs[1].severity, Severity::Info);
    }

    #[test]
    fn without_path_does_not_run() {
        let runner = FakeRunner::new();
        let msgs = TemplateRulesChecker::new()
            .check(&runner, &CheckInput::new("Resources: {}\n"))
            .unwrap();
        assert!(msgs.is_empty());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn mounts_directory_read_only_without_network() {
        let runner = FakeRunner::new().respond_ok("docker", "[]");
        let path = Path::new("/work/stack/template.yml");
        let input = CheckInput::new("Resources: {}\n").with_path(Some(path));
        TemplateRulesChecker::new().check(&runner, &input).unwrap();

        let calls = runner.calls_to("docker");
        assert_eq!(calls.len(), 1);
        let args = &calls[0].args;
        assert!(args.windows(2).any(|w| w == ["--network", "none"]));
        assert!(args.windows(2).any(|w| w == ["-v", "/work/stack:/data:ro"]));
        assert_eq!(args.last().map(String::as_str), Some("template.yml"));
    }

    #[test]
    fn garbage_output_is_one_warning() {
        let runner = FakeRunner::new().respond("docker", RunOutput::new(2, "not json", ""));
        let path = Path::new("/work/template.yml");
        let input = CheckInput::new("Resources: {}\n").with_path(Some(path));
        let msgs = run_checker(&TemplateRulesChecker::new(), &runner, &input);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].severity, Severity::Warning);
        assert_eq!(msgs[0].message, MALFORMED_OUTPUT);
    }

    #[test]
    fn missing_runtime_is_one_info() {
        let path = Path::new("/work/template.yml");
        let input = CheckInput::new("Resources: {}\n").with_path(Some(path));
        let msgs = run_checker(&TemplateRulesChecker::new(), &FakeRunner::new(), &input);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].severity, Severity::Info);
        assert_eq!(msgs[0].source, Source::TemplateChecker);
    }
}
