//! Dialect classification.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::parser::parse_document;

/// Root keys that mark a pipeline definition.
pub const PIPELINE_ROOT_MARKERS: [&str; 7] =
    ["steps", "jobs", "stages", "pool", "trigger", "pr", "variables"];

/// The document flavours the engine understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Infrastructure template (CloudFormation-style).
    Template,
    /// CI pipeline (Azure-Pipelines-style).
    Pipeline,
    /// Anything else.
    Generic,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Template => "template",
            Dialect::Pipeline => "pipeline",
            Dialect::Generic => "generic",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dialect '{0}' (expected template, pipeline or generic)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" | "cloudformation" | "cfn" => Ok(Dialect::Template),
            "pipeline" | "azure" | "azure-pipelines" => Ok(Dialect::Pipeline),
            "generic" | "yaml" => Ok(Dialect::Generic),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

/// Classify a parsed document.
pub fn detect_document(doc: &Document) -> Dialect {
    let Some(root) = doc.as_mapping() else {
        return Dialect::Generic;
    };

    if root.contains_key("AWSTemplateFormatVersion")
        || root.get("Resources").and_then(Document::as_mapping).is_some()
    {
        return Dialect::Template;
    }

    if PIPELINE_ROOT_MARKERS.iter().any(|k| root.contains_key(k)) {
        return Dialect::Pipeline;
    }

    Dialect::Generic
}

/// Classify raw content. A forced dialect always wins; unparseable content
/// is generic.
pub fn detect(content: &str, forced: Option<Dialect>) -> Dialect {
    if let Some(dialect) = forced {
        return dialect;
    }
    parse_document(content)
        .map(|doc| detect_document(&doc))
        .unwrap_or(Dialect::Generic)
}
