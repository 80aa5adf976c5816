//! YAML/JSON conversion helpers.

use crate::document::{to_yaml_string, Document};
use crate::error::{DoctorError, Result};
use crate::parser::parse_bounded;

/// Convert a YAML document to pretty-printed JSON.
///
/// Short-form tags come out as their long-form intrinsic objects.
pub fn yaml_to_json(content: &str) -> Result<String> {
    let doc = parse_bounded(content, None)?;
    serde_json::to_string_pretty(&doc.to_json()).map_err(|e| DoctorError::Other(e.into()))
}

/// Convert a JSON document to block-style YAML.
pub fn json_to_yaml(content: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| DoctorError::InvalidInput {
            message: format!("not valid JSON: {}", e),
        })?;
    Ok(to_yaml_string(&Document::from(value)))
}
