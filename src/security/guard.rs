//! Preflight guard.
//!
//! [`guard`] inspects raw content before any parser or external tool sees
//! it. Every check runs, so a caller sees all violations at once; any
//! error-severity message means the document must not be parsed.

use std::collections::BTreeSet;

use tracing::debug;

use super::patterns::{
    find_tokens, RE_ALIAS, RE_ANCHOR, RE_DOUBLE_BANG_TAG, RE_LOCAL_TAG, RE_VERBATIM_TAG,
};
use crate::error::{DoctorError, Result};
use crate::lint::{LintMessage, MessageKind, Severity, Source};

/// Maximum accepted document size in bytes.
pub const MAX_BYTES: usize = 2 * 1024 * 1024;

/// Maximum accepted number of lines.
pub const MAX_LINES: usize = 15_000;

/// Maximum share of control characters before content counts as binary.
pub const MAX_CONTROL_RATIO: f64 = 0.01;

/// Accepted file extensions (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

/// Accepted media types.
pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "application/yaml",
    "application/x-yaml",
    "text/yaml",
    "text/x-yaml",
    "text/plain",
];

/// CloudFormation short-form intrinsic function tags.
pub const CLOUDFORMATION_TAGS: [&str; 20] = [
    "Ref",
    "Sub",
    "GetAtt",
    "Join",
    "Select",
    "Split",
    "FindInMap",
    "GetAZs",
    "ImportValue",
    "Base64",
    "Cidr",
    "If",
    "Equals",
    "And",
    "Or",
    "Not",
    "Condition",
    "Transform",
    "ToJsonString",
    "Length",
];

/// Caller-controlled relaxations and metadata for the guard.
#[derive(Debug, Clone, Default)]
pub struct GuardOptions {
    /// Original filename, checked against the extension allow-list.
    pub filename: Option<String>,
    /// Declared media type, checked against the MIME allow-list.
    pub mime_type: Option<String>,
    /// Downgrade JSON and anchor/alias violations to warnings.
    pub relax_security: bool,
    pub allow_anchors: bool,
    pub allow_aliases: bool,
    /// Single-bang local tags that may appear (`Ref` allows `!Ref`).
    pub allowed_tags: BTreeSet<String>,
}

impl GuardOptions {
    /// Allow the CloudFormation intrinsic function tags.
    pub fn with_cloudformation_tags(mut self) -> Self {
        self.allowed_tags
            .extend(CLOUDFORMATION_TAGS.iter().map(|t| t.to_string()));
        self
    }

    fn relaxable(&self) -> Severity {
        if self.relax_security {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

fn violation(severity: Severity, rule: &str, message: impl Into<String>) -> LintMessage {
    LintMessage::new(Source::Parser, severity, message)
        .with_rule(format!("security/{}", rule))
        .with_kind(MessageKind::Semantic)
}

/// Run every preflight check against `content`.
pub fn guard(content: &str, options: &GuardOptions) -> Vec<LintMessage> {
    let mut messages = Vec::new();

    messages.extend(check_filename(options));
    messages.extend(check_size(content));
    messages.extend(check_line_count(content));
    messages.extend(check_binary(content));
    messages.extend(check_json(content, options));
    messages.extend(check_anchors_and_aliases(content, options));
    messages.extend(check_tags(content, options));

    debug!(
        violations = messages.len(),
        bytes = content.len(),
        "Preflight checks finished"
    );
    messages
}

/// Run the guard and turn error-severity findings into [`DoctorError::SecurityRejected`].
///
/// Returns the non-fatal findings (warnings) on success.
pub fn ensure_safe(content: &str, options: &GuardOptions) -> Result<Vec<LintMessage>> {
    let messages = guard(content, options);
    if is_rejected(&messages) {
        return Err(rejection(&messages));
    }
    Ok(messages)
}

/// [`ensure_safe`] for raw file bytes. Returns the decoded text and the
/// guard warnings.
pub fn ensure_safe_bytes(
    bytes: Vec<u8>,
    options: &GuardOptions,
) -> Result<(String, Vec<LintMessage>)> {
    let content = decode(bytes, options).map_err(|messages| rejection(&messages))?;
    let warnings = ensure_safe(&content, options)?;
    Ok((content, warnings))
}

/// Decode raw bytes before the text checks run.
///
/// Bytes that are not UTF-8 cannot be scanned as YAML; they come back as
/// a binary-content rejection (plus any filename violations) rather than
/// as a read failure.
pub fn decode(
    bytes: Vec<u8>,
    options: &GuardOptions,
) -> std::result::Result<String, Vec<LintMessage>> {
    String::from_utf8(bytes).map_err(|e| {
        let mut messages = check_filename(options);
        messages.push(violation(
            Severity::Error,
            "binary",
            format!(
                "Document is not valid UTF-8 (offset {}) and looks binary",
                e.utf8_error().valid_up_to()
            ),
        ));
        messages
    })
}

fn rejection(messages: &[LintMessage]) -> DoctorError {
    let reasons = messages
        .iter()
        .filter(|m| m.is_error())
        .map(|m| m.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    DoctorError::SecurityRejected { reasons }
}

/// Whether the guard output blocks further processing.
pub fn is_rejected(messages: &[LintMessage]) -> bool {
    messages.iter().any(LintMessage::is_error)
}

fn check_filename(options: &GuardOptions) -> Vec<LintMessage> {
    let mut messages = Vec::new();

    if let Some(name) = &options.filename {
        let lower = name.to_ascii_lowercase();
        if !ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            messages.push(violation(
                Severity::Error,
                "extension",
                format!("File '{}' must have a .yaml or .yml extension", name),
            ));
        }
    }

    if let Some(mime) = &options.mime_type {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ALLOWED_MIME_TYPES.contains(&essence.as_str()) {
            messages.push(violation(
                Severity::Error,
                "mime-type",
                format!("Media type '{}' is not an accepted YAML type", mime),
            ));
        }
    }

    messages
}

fn check_size(content: &str) -> Option<LintMessage> {
    (content.len() > MAX_BYTES).then(|| {
        violation(
            Severity::Error,
            "size",
            format!(
                "Document is {} bytes; the limit is {} bytes",
                content.len(),
                MAX_BYTES
            ),
        )
    })
}

/// Count lines the way a CR/LF-tolerant split would.
fn line_count(content: &str) -> usize {
    let bytes = content.as_bytes();
    let mut breaks = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => breaks += 1,
            b'\r' => {
                breaks += 1;
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    breaks + 1
}

fn check_line_count(content: &str) -> Option<LintMessage> {
    let lines = line_count(content);
    (lines > MAX_LINES).then(|| {
        violation(
            Severity::Error,
            "line-count",
            format!("Document has {} lines; the limit is {}", lines, MAX_LINES),
        )
    })
}

fn check_binary(content: &str) -> Option<LintMessage> {
    if content.contains('\0') {
        return Some(violation(
            Severity::Error,
            "binary",
            "Document contains NUL bytes and looks binary",
        ));
    }

    let mut total = 0usize;
    let mut control = 0usize;
    for c in content.chars() {
        total += 1;
        if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
            control += 1;
        }
    }
    if total == 0 {
        return None;
    }

    let ratio = control as f64 / total as f64;
    (ratio > MAX_CONTROL_RATIO).then(|| {
        violation(
            Severity::Error,
            "control-chars",
            format!(
                "Document has {} control characters ({:.1}% of content)",
                control,
                ratio * 100.0
            ),
        )
    })
}

fn check_json(content: &str, options: &GuardOptions) -> Option<LintMessage> {
    let trimmed = content.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .is_ok()
        .then(|| {
            violation(
                options.relaxable(),
                "json",
                "Document is JSON, not YAML; convert it before validating",
            )
        })
}

fn check_anchors_and_aliases(content: &str, options: &GuardOptions) -> Vec<LintMessage> {
    let mut messages = Vec::new();

    if !options.allow_anchors {
        let anchors = find_tokens(&RE_ANCHOR, content);
        if !anchors.is_empty() {
            messages.push(violation(
                options.relaxable(),
                "anchor",
                format!("YAML anchors are not allowed (found {})", anchors.join(", ")),
            ));
        }
    }

    if !options.allow_aliases {
        let aliases = find_tokens(&RE_ALIAS, content);
        if !aliases.is_empty() {
            messages.push(violation(
                options.relaxable(),
                "alias",
                format!("YAML aliases are not allowed (found {})", aliases.join(", ")),
            ));
        }
    }

    messages
}

fn check_tags(content: &str, options: &GuardOptions) -> Vec<LintMessage> {
    let mut messages = Vec::new();

    for tag in find_tokens(&RE_DOUBLE_BANG_TAG, content) {
        messages.push(violation(
            Severity::Error,
            "tag",
            format!("Explicit type tag '{}' is not allowed", tag),
        ));
    }

    for tag in find_tokens(&RE_VERBATIM_TAG, content) {
        messages.push(violation(
            Severity::Error,
            "tag",
            format!("Verbatim tag '{}' is not allowed", tag),
        ));
    }

    for tag in find_tokens(&RE_LOCAL_TAG, content) {
        if !options.allowed_tags.contains(&tag) {
            messages.push(violation(
                Severity::Error,
                "tag",
                format!("Custom tag '!{}' is not in the allowed tag list", tag),
            ));
        }
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(messages: &[LintMessage]) -> Vec<&LintMessage> {
        messages.iter().filter(|m| m.is_error()).collect()
    }

    #[test]
    fn clean_document_passes() {
        let messages = guard("name: app\nitems:\n  - a\n  - b\n", &GuardOptions::default());
        assert!(messages.is_empty());
    }

    #[test]
    fn rejects_wrong_extension() {
        let options = GuardOptions {
            filename: Some("template.json".into()),
            ..Default::default()
        };
        let messages = guard("a: 1\n", &options);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].rule_id.as_deref(), Some("security/extension"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let options = GuardOptions {
            filename: Some("PIPELINE.YML".into()),
            ..Default::default()
        };
        assert!(guard("a: 1\n", &options).is_empty());
    }

    #[test]
    fn mime_type_ignores_parameters() {
        let ok = GuardOptions {
            mime_type: Some("application/x-yaml; charset=utf-8".into()),
            ..Default::default()
        };
        assert!(guard("a: 1\n", &ok).is_empty());

        let bad = GuardOptions {
            mime_type: Some("application/octet-stream".into()),
            ..Default::default()
        };
        assert_eq!(errors(&guard("a: 1\n", &bad)).len(), 1);
    }

    #[test]
    fn rejects_oversized_content_by_bytes() {
        // Multi-byte characters: fewer chars than bytes
        let line = format!("k: {}\n", "é".repeat(1000));
        let content = line.repeat(MAX_BYTES / line.len() + 1);
        assert!(content.chars().count() < content.len());

        let messages = guard(&content, &GuardOptions::default());
        assert!(messages
            .iter()
            .any(|m| m.rule_id.as_deref() == Some("security/size")));
    }

    #[test]
    fn rejects_too_many_lines() {
        let content = "a\n".repeat(MAX_LINES + 1);
        let messages = guard(&content, &GuardOptions::default());
        assert!(messages
            .iter()
            .any(|m| m.rule_id.as_deref() == Some("security/line-count")));
    }

    #[test]
    fn line_count_tolerates_crlf_and_cr() {
        assert_eq!(line_count("a\r\nb\rc\nd"), 4);
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\n"), 2);
    }

    #[test]
    fn undecodable_bytes_are_binary() {
        let png = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0xff, 0x00];
        let options = GuardOptions {
            filename: Some("image.png".into()),
            ..Default::default()
        };
        let messages = decode(png.clone(), &options).unwrap_err();
        let rules: Vec<_> = messages.iter().filter_map(|m| m.rule_id.as_deref()).collect();
        assert_eq!(rules, vec!["security/extension", "security/binary"]);

        let err = ensure_safe_bytes(png, &GuardOptions::default()).unwrap_err();
        assert!(matches!(err, DoctorError::SecurityRejected { .. }));
    }

    #[test]
    fn utf8_bytes_decode_and_pass() {
        let (content, warnings) =
            ensure_safe_bytes(b"a: 1\n".to_vec(), &GuardOptions::default()).unwrap();
        assert_eq!(content, "a: 1\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn rejects_nul_bytes() {
        let messages = guard("a: 1\0\n", &GuardOptions::default());
        assert_eq!(messages[0].rule_id.as_deref(), Some("security/binary"));
    }

    #[test]
    fn rejects_dense_control_characters() {
        let content = format!("a: {}\n", "\u{1}x".repeat(20));
        let messages = guard(&content, &GuardOptions::default());
        assert!(messages
            .iter()
            .any(|m| m.rule_id.as_deref() == Some("security/control-chars")));
    }

    #[test]
    fn tolerates_sparse_control_characters() {
        let content = format!("a: {}\u{7}\n", "x".repeat(500));
        assert!(guard(&content, &GuardOptions::default()).is_empty());
    }

    #[test]
    fn json_document_is_error_or_warning_when_relaxed() {
        let json = r#"{"Resources": {}}"#;
        let strict = guard(json, &GuardOptions::default());
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].severity, Severity::Error);

        let relaxed = GuardOptions {
            relax_security: true,
            ..Default::default()
        };
        let messages = guard(json, &relaxed);
        assert_eq!(messages[0].severity, Severity::Warning);
    }

    #[test]
    fn flow_yaml_that_is_not_json_passes() {
        assert!(guard("{a: 1, b: [x, y]}\n", &GuardOptions::default()).is_empty());
    }

    #[test]
    fn anchor_is_single_error_mentioning_anchor() {
        let messages = guard("base: &anchor\n  a: 1\n", &GuardOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Error);
        assert!(messages[0].message.contains("anchor"));
    }

    #[test]
    fn alias_is_rejected_without_anchor() {
        let messages = guard("a: *missing\n", &GuardOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].rule_id.as_deref(), Some("security/alias"));
    }

    #[test]
    fn alias_violation_independent_of_anchor_permission() {
        let options = GuardOptions {
            allow_anchors: true,
            ..Default::default()
        };
        let messages = guard("a: &x 1\nb: *x\n", &options);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].rule_id.as_deref(), Some("security/alias"));
    }

    #[test]
    fn relaxed_aliases_are_warnings() {
        let options = GuardOptions {
            relax_security: true,
            ..Default::default()
        };
        let messages = guard("a: &x 1\nb: *x\n", &options);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.severity == Severity::Warning));
    }

    #[test]
    fn double_bang_and_verbatim_tags_always_rejected() {
        let options = GuardOptions {
            relax_security: true,
            ..Default::default()
        }
        .with_cloudformation_tags();
        let messages = guard("a: !!python/object x\nb: !<tag:x> y\n", &options);
        assert_eq!(errors(&messages).len(), 2);
    }

    #[test]
    fn local_tags_need_allow_list() {
        let content = "Bucket: !Ref MyBucket\n";
        let messages = guard(content, &GuardOptions::default());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message.contains("!Ref"));

        let allowed = GuardOptions::default().with_cloudformation_tags();
        assert!(guard(content, &allowed).is_empty());
    }

    #[test]
    fn reports_every_violation_at_once() {
        let options = GuardOptions {
            filename: Some("doc.txt".into()),
            ..Default::default()
        };
        let messages = guard("a: &x 1\nb: *x\nc: !Custom 2\n", &options);
        assert_eq!(errors(&messages).len(), 4);
    }

    #[test]
    fn ensure_safe_returns_warnings_or_rejects() {
        let relaxed = GuardOptions {
            relax_security: true,
            ..Default::default()
        };
        let warnings = ensure_safe("a: &x 1\n", &relaxed).unwrap();
        assert_eq!(warnings.len(), 1);

        let err = ensure_safe("a: &x 1\n", &GuardOptions::default()).unwrap_err();
        assert!(matches!(err, DoctorError::SecurityRejected { .. }));
    }
}
