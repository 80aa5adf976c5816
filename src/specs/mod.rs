//! Reference specs for the dialect engines.
//!
//! Each spec is read from an override file when one is configured and
//! falls back to the copy embedded in the binary when the override is
//! missing or malformed. Fallbacks are logged, never reported as messages.

pub mod cache;
pub mod pipeline;
pub mod resource;

use std::fmt;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::{DoctorError, Result};

pub use cache::SpecCache;
pub use pipeline::{StepSchema, StepSchemaFile};
pub use resource::{
    ContainerType, PrimitiveType, PropertySpec, ResourceSpec, ResourceSpecFile, ResourceType,
};

/// Default specs embedded at compile time.
static SPECS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/specs");

/// Where a loaded spec came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SpecSource {
    #[default]
    Embedded,
    File(PathBuf),
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecSource::Embedded => f.write_str("embedded"),
            SpecSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A spec that can be loaded from an override file or the embedded default.
pub trait SpecDocument: Default + Send + Sync + 'static {
    /// On-disk shape.
    type File: DeserializeOwned;

    /// Human name used in logs.
    const KIND: &'static str;

    /// File name under the embedded `specs/` directory.
    const EMBEDDED_FILE: &'static str;

    fn from_file(file: Self::File, source: SpecSource) -> Self;

    /// Why a decoded spec cannot be used, if it cannot.
    ///
    /// Every on-disk field has a default, so a file of the wrong shape
    /// decodes to an empty spec.
    fn defect(&self) -> Option<&'static str>;
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false)
}

fn read_override<T: SpecDocument>(path: &Path) -> Result<T> {
    let unavailable = |message: String| DoctorError::SpecUnavailable {
        path: path.to_path_buf(),
        message,
    };

    let text = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    let file: T::File = if is_yaml_path(path) {
        serde_yaml::from_str(&text).map_err(|e| unavailable(e.to_string()))?
    } else {
        serde_json::from_str(&text).map_err(|e| unavailable(e.to_string()))?
    };
    let spec = T::from_file(file, SpecSource::File(path.to_path_buf()));
    match spec.defect() {
        Some(reason) => Err(unavailable(reason.to_string())),
        None => Ok(spec),
    }
}

/// The embedded default for `T`.
pub fn embedded<T: SpecDocument>() -> T {
    let parsed = SPECS_DIR
        .get_file(T::EMBEDDED_FILE)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| "embedded spec missing".to_string())
        .and_then(|text| serde_json::from_str::<T::File>(text).map_err(|e| e.to_string()));

    match parsed {
        Ok(file) => T::from_file(file, SpecSource::Embedded),
        Err(e) => {
            error!(kind = T::KIND, "Embedded spec is unusable: {}", e);
            T::default()
        }
    }
}

/// Load `T` from `override_path`, falling back to the embedded default.
pub fn load<T: SpecDocument>(override_path: Option<&Path>) -> T {
    match override_path {
        Some(path) => match read_override::<T>(path) {
            Ok(spec) => {
                debug!(kind = T::KIND, path = %path.display(), "Loaded spec override");
                spec
            }
            Err(e) => {
                warn!(kind = T::KIND, "{}; using embedded default", e);
                embedded()
            }
        },
        None => embedded(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_specs_are_present() {
        let resources: ResourceSpec = embedded();
        assert!(resources.get("AWS::S3::Bucket").is_some());
        assert_eq!(resources.source, SpecSource::Embedded);

        let steps: StepSchema = embedded();
        assert!(steps.known_step_keys.iter().any(|k| k == "script"));
    }

    #[test]
    fn missing_override_falls_back() {
        let spec: ResourceSpec = load(Some(Path::new("/nonexistent/spec.json")));
        assert_eq!(spec.source, SpecSource::Embedded);
        assert!(!spec.types.is_empty());
    }

    #[test]
    fn malformed_override_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let spec: StepSchema = load(Some(file.path()));
        assert_eq!(spec.source, SpecSource::Embedded);
    }

    #[test]
    fn wrong_shape_override_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        std::fs::write(&path, r#"{"PropertyTypes": {}, "Resources": {}}"#).unwrap();

        let resources: ResourceSpec = load(Some(&path));
        assert_eq!(resources.source, SpecSource::Embedded);
        assert!(resources.get("AWS::S3::Bucket").is_some());

        let steps: StepSchema = load(Some(&path));
        assert_eq!(steps.source, SpecSource::Embedded);
        assert!(!steps.known_step_keys.is_empty());
    }

    #[test]
    fn yaml_override_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.yml");
        std::fs::write(&path, "rootKeys: [steps]\nstepKeys: [run]\n").unwrap();
        let spec: StepSchema = load(Some(&path));
        assert_eq!(spec.source, SpecSource::File(path));
        assert_eq!(spec.known_step_keys, vec!["run"]);
    }

    #[test]
    fn source_display() {
        assert_eq!(SpecSource::Embedded.to_string(), "embedded");
        assert_eq!(SpecSource::File("a/b.json".into()).to_string(), "a/b.json");
    }
}
