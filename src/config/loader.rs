//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::schema::EngineConfig;
use crate::error::{DoctorError, Result};

/// File names looked up in a project root, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".yamldoctor.yml", ".yamldoctor.yaml"];

/// Find the config file in `project_root`, if any.
pub fn discover(project_root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
}

/// Load and parse one config file.
///
/// Relative spec paths inside the file are resolved against the file's
/// directory.
pub fn load_config_file(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path).map_err(|e| DoctorError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut config: EngineConfig = if content.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_yaml::from_str(&content).map_err(|e| DoctorError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    if let Some(base) = path.parent() {
        resolve_relative(&mut config.template_spec, base);
        resolve_relative(&mut config.pipeline_spec, base);
        resolve_relative(&mut config.rules.ruleset, base);
    }

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

fn resolve_relative(path: &mut Option<PathBuf>, base: &Path) {
    if let Some(p) = path {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    }
}

/// Load the explicit file when given, else the discovered one, else defaults.
pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<EngineConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => match discover(project_root) {
            Some(path) => load_config_file(&path),
            None => Ok(EngineConfig::default()),
        },
    }
}
