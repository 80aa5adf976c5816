//! Per-call validation options.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SecurityConfig;
use crate::detection::Dialect;
use crate::security::GuardOptions;
use crate::shell::ToolRunner;

/// Options for one [`Validator::validate`](super::Validator::validate) call.
///
/// Unset options fall back to the validator's [`EngineConfig`](crate::config::EngineConfig).
/// The security switches are additive: a relaxation enabled in the config
/// cannot be turned off per call.
#[derive(Clone, Default)]
pub struct ValidateOptions {
    /// Original filename, checked against the extension allow-list.
    pub filename: Option<String>,
    /// Declared media type.
    pub mime_type: Option<String>,
    /// Force a dialect instead of detecting one.
    pub provider: Option<Dialect>,
    /// Runner for external checkers; defaults to the validator's.
    pub tool_runner: Option<Arc<dyn ToolRunner>>,
    /// Declarative ruleset; enables the rules checker.
    pub ruleset_path: Option<PathBuf>,
    pub parse_timeout_ms: Option<u64>,
    pub relax_security: bool,
    pub allow_anchors: bool,
    pub allow_aliases: bool,
    pub allowed_tags: BTreeSet<String>,
    /// File the content was read from. Needed by the template rules checker.
    pub source_path: Option<PathBuf>,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_provider(mut self, provider: Option<Dialect>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_tool_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.tool_runner = Some(runner);
        self
    }

    pub fn with_ruleset(mut self, path: impl Into<PathBuf>) -> Self {
        self.ruleset_path = Some(path.into());
        self
    }

    pub fn with_parse_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.parse_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn relaxed(mut self) -> Self {
        self.relax_security = true;
        self
    }

    pub fn allowing_anchors(mut self) -> Self {
        self.allow_anchors = true;
        self
    }

    pub fn allowing_aliases(mut self) -> Self {
        self.allow_aliases = true;
        self
    }

    pub fn with_allowed_tag(mut self, tag: impl Into<String>) -> Self {
        self.allowed_tags.insert(tag.into().trim_start_matches('!').to_string());
        self
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Guard options from these options layered over the config defaults.
    pub fn guard_options(&self, defaults: &SecurityConfig) -> GuardOptions {
        let mut guard = defaults.guard_options();
        guard.filename = self.filename.clone();
        guard.mime_type = self.mime_type.clone();
        guard.relax_security |= self.relax_security;
        guard.allow_anchors |= self.allow_anchors;
        guard.allow_aliases |= self.allow_aliases;
        guard.allowed_tags.extend(self.allowed_tags.iter().cloned());
        guard
    }
}

impl fmt::Debug for ValidateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("provider", &self.provider)
            .field("tool_runner", &self.tool_runner.as_ref().map(|_| "<runner>"))
            .field("ruleset_path", &self.ruleset_path)
            .field("parse_timeout_ms", &self.parse_timeout_ms)
            .field("relax_security", &self.relax_security)
            .field("allow_anchors", &self.allow_anchors)
            .field("allow_aliases", &self.allow_aliases)
            .field("allowed_tags", &self.allowed_tags)
            .field("source_path", &self.source_path)
            .finish()
    }
}
