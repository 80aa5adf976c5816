//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! engine configuration once, applies global flag overrides and routes the
//! subcommand to its implementation.

pub mod convert;
pub mod dispatcher;
pub mod fix;
pub mod schema;
pub mod suggest;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use std::fs;
use std::path::Path;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::security::ensure_safe_bytes;
use crate::ui::UserInterface;

/// Read `path` and run the preflight checks on it.
///
/// Guard warnings are shown; any guard error rejects the file.
pub(crate) fn read_guarded(
    path: &Path,
    config: &EngineConfig,
    ui: &mut dyn UserInterface,
) -> Result<String> {
    let mut options = config.security.guard_options();
    options.filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let (content, warnings) = ensure_safe_bytes(fs::read(path)?, &options)?;
    for warning in warnings {
        ui.warning(&format!("{}: {}", path.display(), warning.message));
    }
    Ok(content)
}
