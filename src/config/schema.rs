//! Engine configuration.
//!
//! Maps to `.yamldoctor.yml`. Every field has a default, so an empty file
//! (or no file) yields a working configuration.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::checkers::{style, template_rules};
use crate::parser::DEFAULT_TIMEOUT_MS;
use crate::security::GuardOptions;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Override for the template resource spec (JSON or YAML).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_spec: Option<PathBuf>,

    /// Override for the pipeline step schema (JSON or YAML).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<PathBuf>,

    /// YAML parse budget in milliseconds (clamped to 1..=10000).
    pub parse_timeout_ms: u64,

    /// Artificial delay before parsing, in milliseconds.
    #[serde(skip_serializing_if = "is_zero")]
    pub parse_delay_ms: u64,

    /// Budget for each external checker process, in milliseconds.
    pub checker_timeout_ms: u64,

    /// Container runtime used for containerized checkers.
    pub container_runtime: String,

    pub style: StyleConfig,

    pub template_rules: TemplateRulesConfig,

    pub rules: RulesConfig,

    pub security: SecurityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_spec: None,
            pipeline_spec: None,
            parse_timeout_ms: DEFAULT_TIMEOUT_MS,
            parse_delay_ms: 0,
            checker_timeout_ms: 10_000,
            container_runtime: "docker".to_string(),
            style: StyleConfig::default(),
            template_rules: TemplateRulesConfig::default(),
            rules: RulesConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn checker_timeout(&self) -> Duration {
        Duration::from_millis(self.checker_timeout_ms)
    }

    pub fn parse_delay(&self) -> Duration {
        Duration::from_millis(self.parse_delay_ms)
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Style checker (`yamllint`) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StyleConfig {
    /// Local command.
    pub command: String,

    /// Container image used when the local command cannot run.
    pub image: String,

    /// yamllint configuration passed with `-d` (path or inline YAML).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            command: style::DEFAULT_COMMAND.to_string(),
            image: style::DEFAULT_IMAGE.to_string(),
            config: None,
        }
    }
}

/// Template rules checker (`cfn-lint`) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TemplateRulesConfig {
    pub image: String,
}

impl Default for TemplateRulesConfig {
    fn default() -> Self {
        Self {
            image: template_rules::DEFAULT_IMAGE.to_string(),
        }
    }
}

/// Declarative rules checker (`spectral`) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RulesConfig {
    pub command: String,

    /// Ruleset applied when a validation does not name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<PathBuf>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            command: crate::checkers::declarative::DEFAULT_COMMAND.to_string(),
            ruleset: None,
        }
    }
}

/// Preflight defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SecurityConfig {
    /// Downgrade JSON, anchor and alias findings to warnings.
    #[serde(skip_serializing_if = "is_false")]
    pub relax: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub allow_anchors: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub allow_aliases: bool,

    /// Local tags (without the `!`) that may appear.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_tags: BTreeSet<String>,

    /// Also allow the CloudFormation short-form intrinsic tags.
    #[serde(skip_serializing_if = "is_false")]
    pub cloudformation_tags: bool,
}

impl SecurityConfig {
    /// Guard options seeded from these defaults.
    pub fn guard_options(&self) -> GuardOptions {
        let options = GuardOptions {
            relax_security: self.relax,
            allow_anchors: self.allow_anchors,
            allow_aliases: self.allow_aliases,
            allowed_tags: self.allowed_tags.clone(),
            ..GuardOptions::default()
        };
        if self.cloudformation_tags {
            options.with_cloudformation_tags()
        } else {
            options
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config: EngineConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.parse_timeout_ms, 5_000);
        assert_eq!(config.checker_timeout_ms, 10_000);
        assert_eq!(config.style.command, "yamllint");
        assert_eq!(config.container_runtime, "docker");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config: EngineConfig = serde_yaml::from_str(
            "style:\n  config: relaxed\nsecurity:\n  allow_anchors: true\n  allowed_tags: [Ref]\n",
        )
        .unwrap();
        assert_eq!(config.style.command, "yamllint");
        assert_eq!(config.style.config.as_deref(), Some("relaxed"));
        assert!(config.security.allow_anchors);
        assert!(!config.security.allow_aliases);
    }

    #[test]
    fn guard_options_follow_security_section() {
        let security = SecurityConfig {
            relax: true,
            cloudformation_tags: true,
            ..SecurityConfig::default()
        };
        let options = security.guard_options();
        assert!(options.relax_security);
        assert!(options.allowed_tags.contains("Ref"));
    }

    #[test]
    fn schema_lists_fields() {
        let schema = schemars::schema_for!(EngineConfig);
        let json = serde_json::to_value(&schema).unwrap();
        assert!(json["properties"]["parse_timeout_ms"].is_object());
        assert!(json["properties"]["security"].is_object());
    }
}
