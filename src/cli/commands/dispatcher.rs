//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::config::{self, EngineConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load the config file and apply global flag overrides.
    pub fn engine_config(&self, cli: &Cli) -> Result<EngineConfig> {
        let mut config = config::load(cli.config.as_deref(), &self.project_root)?;
        if let Some(path) = &cli.template_spec {
            config.template_spec = Some(path.clone());
        }
        if let Some(path) = &cli.pipeline_spec {
            config.pipeline_spec = Some(path.clone());
        }
        if let Some(ms) = cli.parse_timeout_ms {
            config.parse_timeout_ms = ms;
        }
        debug!(?config, "Resolved engine config");
        Ok(config)
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if let Commands::Schema(args) = &cli.command {
            return super::schema::SchemaCommand::new(args.clone()).execute(ui);
        }

        let config = self.engine_config(cli)?;
        match &cli.command {
            Commands::Validate(args) => {
                super::validate::ValidateCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Suggest(args) => {
                super::suggest::SuggestCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Fix(args) => super::fix::FixCommand::new(config, args.clone()).execute(ui),
            Commands::Convert(args) => {
                super::convert::ConvertCommand::new(config, args.clone()).execute(ui)
            }
            Commands::Schema(args) => super::schema::SchemaCommand::new(args.clone()).execute(ui),
        }
    }
}
