//! Suggest command implementation.
//!
//! The `yamldoctor suggest` command lists numbered repair suggestions. The
//! numbers are what `yamldoctor fix --select` takes.

use crate::cli::args::SuggestArgs;
use crate::config::EngineConfig;
use crate::error::{DoctorError, Result};
use crate::lint::OutputFormat;
use crate::ui::UserInterface;
use crate::validate::Validator;

use super::dispatcher::{Command, CommandResult};
use super::read_guarded;

/// The suggest command implementation.
pub struct SuggestCommand {
    config: EngineConfig,
    args: SuggestArgs,
}

impl SuggestCommand {
    pub fn new(config: EngineConfig, args: SuggestArgs) -> Self {
        Self { config, args }
    }

    pub fn args(&self) -> &SuggestArgs {
        &self.args
    }
}

impl Command for SuggestCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let file = self.args.path.display().to_string();
        let content = read_guarded(&self.args.path, &self.config, ui)?;
        let validator = Validator::new(self.config.clone());
        let (dialect, analysis) = validator.analyze(&content, self.args.provider)?;

        if self.args.format == OutputFormat::Json {
            let value = serde_json::json!({
                "file": file,
                "provider": dialect,
                "suggestions": analysis.suggestions,
            });
            let rendered =
                serde_json::to_string_pretty(&value).map_err(|e| DoctorError::Other(e.into()))?;
            ui.message(&rendered);
            return Ok(CommandResult::success());
        }

        if analysis.suggestions.is_empty() {
            ui.success(&format!("{}: no suggestions ({})", file, dialect));
            return Ok(CommandResult::success());
        }

        ui.message(&format!(
            "{}: {} suggestion(s) ({})",
            file,
            analysis.suggestions.len(),
            dialect
        ));
        for (index, suggestion) in analysis.suggestions.iter().enumerate() {
            ui.message(&format!(
                "  [{}] {} {}: {}",
                index, suggestion.kind, suggestion.path, suggestion.message
            ));
            match &suggestion.fix {
                Some(op) => ui.message(&format!("      fix: {}", op)),
                None => ui.message("      (no automatic fix)"),
            }
        }

        Ok(CommandResult::success())
    }
}
