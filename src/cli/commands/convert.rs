//! Convert command implementation.

use std::fs;
use std::path::Path;

use crate::cli::args::{ConvertArgs, ConvertTarget};
use crate::config::EngineConfig;
use crate::convert::{json_to_yaml, yaml_to_json};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::read_guarded;

/// The convert command implementation.
pub struct ConvertCommand {
    config: EngineConfig,
    args: ConvertArgs,
}

impl ConvertCommand {
    pub fn new(config: EngineConfig, args: ConvertArgs) -> Self {
        Self { config, args }
    }

    /// The requested target, else the opposite of the input's extension.
    pub fn target(&self) -> ConvertTarget {
        self.args.to.unwrap_or_else(|| {
            if is_json(&self.args.path) {
                ConvertTarget::Yaml
            } else {
                ConvertTarget::Json
            }
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl Command for ConvertCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = match self.target() {
            ConvertTarget::Json => {
                let content = read_guarded(&self.args.path, &self.config, ui)?;
                yaml_to_json(&content)?
            }
            ConvertTarget::Yaml => json_to_yaml(&fs::read_to_string(&self.args.path)?)?,
        };
        ui.message(output.trim_end());
        Ok(CommandResult::success())
    }
}
