//! Fix command implementation.
//!
//! The `yamldoctor fix` command applies selected suggestions and prints the
//! repaired document, a diff, or writes the file in place.

use std::fs;

use crate::cli::args::FixArgs;
use crate::config::EngineConfig;
use crate::diff::UnifiedDiff;
use crate::error::Result;
use crate::suggest::Analysis;
use crate::ui::UserInterface;
use crate::validate::Validator;

use super::dispatcher::{Command, CommandResult};
use super::read_guarded;

/// The fix command implementation.
pub struct FixCommand {
    config: EngineConfig,
    args: FixArgs,
}

impl FixCommand {
    pub fn new(config: EngineConfig, args: FixArgs) -> Self {
        Self { config, args }
    }

    pub fn args(&self) -> &FixArgs {
        &self.args
    }

    /// Indices to apply, or `None` when nothing says which.
    fn selection(
        &self,
        analysis: &Analysis,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<Vec<usize>>> {
        let fixable: Vec<usize> = analysis
            .suggestions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has_fix())
            .map(|(i, _)| i)
            .collect();

        if !self.args.select.is_empty() {
            return Ok(Some(self.args.select.clone()));
        }
        if self.args.all {
            return Ok(Some(fixable));
        }
        if self.args.interactive || ui.is_interactive() {
            let labels: Vec<String> = fixable
                .iter()
                .map(|&i| {
                    let s = &analysis.suggestions[i];
                    format!("[{}] {}: {}", i, s.path, s.message)
                })
                .collect();
            let chosen = ui.select_many("Apply which fixes?", &labels)?;
            return Ok(Some(chosen.into_iter().map(|c| fixable[c]).collect()));
        }
        Ok(None)
    }
}

impl Command for FixCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let file = self.args.path.display().to_string();
        let content = read_guarded(&self.args.path, &self.config, ui)?;
        let validator = Validator::new(self.config.clone());
        let (dialect, analysis) = validator.analyze(&content, self.args.provider)?;

        if !analysis.suggestions.iter().any(|s| s.has_fix()) {
            ui.success(&format!("{}: nothing to fix", file));
            return Ok(CommandResult::success());
        }

        let Some(indices) = self.selection(&analysis, ui)? else {
            ui.error("Nothing selected; use --select, --all or --interactive");
            return Ok(CommandResult::failure(2));
        };
        if indices.is_empty() {
            ui.warning("No fixes selected");
            return Ok(CommandResult::success());
        }

        let preview = validator.preview_suggestions(
            &content,
            Some(dialect),
            &indices,
            &UnifiedDiff::for_file(&file),
        )?;
        for skipped in &preview.fixes.skipped {
            ui.warning(&format!(
                "Skipped suggestion {}: {}",
                skipped.index, skipped.reason
            ));
        }

        if self.args.diff && preview.diff.has_changes() {
            ui.message(preview.diff.unified.trim_end());
        }

        if self.args.write {
            if preview.fixes.changed() {
                fs::write(&self.args.path, &preview.fixes.content)?;
                ui.success(&format!(
                    "Applied {} fix(es) to {}",
                    preview.fixes.applied.len(),
                    file
                ));
            }
        } else if !self.args.diff {
            ui.message(preview.fixes.content.trim_end());
        }

        if preview.fixes.changed() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
