//! Pipeline step schema.
//!
//! Read from `{"rootKeys": [...], "stepKeys": [...], "stepProperties": [...]}`;
//! `allowedRootKeys` and `knownStepKeys` are accepted as aliases. Order is
//! kept so fuzzy ties resolve the same way every time.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{SpecDocument, SpecSource};

/// Keys that may appear on any step alongside its discriminator.
const COMMON_STEP_PROPERTIES: [&str; 8] = [
    "displayName",
    "name",
    "condition",
    "continueOnError",
    "enabled",
    "env",
    "timeoutInMinutes",
    "retryCountOnTaskFailure",
];

/// Root keys, step discriminators and step properties of a pipeline dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSchema {
    pub allowed_root_keys: Vec<String>,
    pub known_step_keys: Vec<String>,
    pub step_properties: Vec<String>,
    pub source: SpecSource,
}

impl StepSchema {
    pub fn is_root_key(&self, key: &str) -> bool {
        self.allowed_root_keys.iter().any(|k| k == key)
    }

    pub fn is_step_key(&self, key: &str) -> bool {
        self.known_step_keys.iter().any(|k| k == key)
    }

    /// Whether `key` is a recognised non-discriminator step property.
    pub fn is_step_property(&self, key: &str) -> bool {
        self.step_properties.iter().any(|k| k == key)
            || COMMON_STEP_PROPERTIES.contains(&key)
    }

    /// Common properties any step may carry.
    pub fn is_common_property(key: &str) -> bool {
        COMMON_STEP_PROPERTIES.contains(&key)
    }
}

/// On-disk step schema shape.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepSchemaFile {
    #[serde(default, alias = "allowedRootKeys")]
    pub root_keys: Vec<String>,
    #[serde(default, alias = "knownStepKeys")]
    pub step_keys: Vec<String>,
    #[serde(default)]
    pub step_properties: Vec<String>,
}

impl SpecDocument for StepSchema {
    type File = StepSchemaFile;

    const KIND: &'static str = "pipeline step schema";
    const EMBEDDED_FILE: &'static str = "azure-pipelines.json";

    fn from_file(file: Self::File, source: SpecSource) -> Self {
        StepSchema {
            allowed_root_keys: file.root_keys,
            known_step_keys: file.step_keys,
            step_properties: file.step_properties,
            source,
        }
    }

    fn defect(&self) -> Option<&'static str> {
        self.known_step_keys
            .is_empty()
            .then_some("no step keys (stepKeys)")
    }
}
