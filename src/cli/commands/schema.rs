//! Schema command implementation.
//!
//! Prints JSON Schemas for the config file and the spec override formats.

use crate::cli::args::{SchemaArgs, SchemaKind};
use crate::config::EngineConfig;
use crate::error::{DoctorError, Result};
use crate::specs::{ResourceSpecFile, StepSchemaFile};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand {
    args: SchemaArgs,
}

impl SchemaCommand {
    pub fn new(args: SchemaArgs) -> Self {
        Self { args }
    }

    pub fn schema(&self) -> schemars::Schema {
        match self.args.kind {
            SchemaKind::Config => schemars::schema_for!(EngineConfig),
            SchemaKind::TemplateSpec => schemars::schema_for!(ResourceSpecFile),
            SchemaKind::PipelineSpec => schemars::schema_for!(StepSchemaFile),
        }
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let rendered =
            serde_json::to_string_pretty(&self.schema()).map_err(|e| DoctorError::Other(e.into()))?;
        ui.message(&rendered);
        Ok(CommandResult::success())
    }
}
