//! Validate command implementation.
//!
//! The `yamldoctor validate` command runs the full pipeline over files and
//! directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use crate::cli::args::ValidateArgs;
use crate::config::EngineConfig;
use crate::error::{DoctorError, Result};
use crate::lint::{HumanFormatter, JsonFormatter, LintFormatter, OutputFormat, Severity};
use crate::security::CLOUDFORMATION_TAGS;
use crate::shell::ToolRunner;
use crate::ui::{should_use_colors, UserInterface};
use crate::validate::{ValidateOptions, Validator};

use super::dispatcher::{Command, CommandResult};

/// The validate command implementation.
pub struct ValidateCommand {
    config: EngineConfig,
    args: ValidateArgs,
    runner: Option<Arc<dyn ToolRunner>>,
}

impl ValidateCommand {
    pub fn new(config: EngineConfig, args: ValidateArgs) -> Self {
        Self {
            config,
            args,
            runner: None,
        }
    }

    /// Run external checkers through `runner` instead of spawning processes.
    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn args(&self) -> &ValidateArgs {
        &self.args
    }

    fn validator(&self) -> Validator {
        match &self.runner {
            Some(runner) => Validator::with_runner(self.config.clone(), Arc::clone(runner)),
            None => Validator::new(self.config.clone()),
        }
    }

    fn options(&self) -> ValidateOptions {
        let mut options = ValidateOptions::new().with_provider(self.args.provider);
        if let Some(ruleset) = &self.args.ruleset {
            options = options.with_ruleset(ruleset);
        }
        options.relax_security = self.args.relax_security;
        options.allow_anchors = self.args.allow_anchors;
        options.allow_aliases = self.args.allow_aliases;
        for tag in &self.args.allow_tags {
            options = options.with_allowed_tag(tag);
        }
        if self.args.cloudformation_tags {
            options
                .allowed_tags
                .extend(CLOUDFORMATION_TAGS.iter().map(|t| t.to_string()));
        }
        options
    }

    /// Expand directories into the YAML files below them.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in &self.args.paths {
            if path.is_dir() {
                let mut found: Vec<PathBuf> = WalkDir::new(path)
                    .into_iter()
                    .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
                    .map(|e| e.path().to_path_buf())
                    .collect();
                found.sort();
                files.extend(found);
            } else {
                files.push(path.clone());
            }
        }
        files
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let files = self.collect_files();
        if files.is_empty() {
            ui.error("No YAML files found");
            return Ok(CommandResult::failure(2));
        }

        let validator = self.validator();
        let options = self.options();

        let progress = ui.start_progress(files.len(), "validating");
        let results = validator.validate_batch_with(&files, &options, &|path: &Path| {
            progress.tick(&path.display().to_string())
        });
        progress.finish();

        let mut failed = false;
        let mut reports = Vec::new();
        let human = HumanFormatter::new(should_use_colors());
        let json = JsonFormatter::new();

        for (path, outcome) in &results {
            let file = path.display().to_string();
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    failed = true;
                    match self.args.format {
                        OutputFormat::Human => ui.error(&format!("{}: {}", file, e)),
                        OutputFormat::Json => reports.push(serde_json::json!({
                            "file": file,
                            "error": e.to_string(),
                        })),
                    }
                    continue;
                }
            };

            if !result.ok || (self.args.strict && result.count(Severity::Warning) > 0) {
                failed = true;
            }

            match self.args.format {
                OutputFormat::Human => {
                    let mut output = Vec::new();
                    human.format(&file, result, &mut output)?;
                    ui.message(String::from_utf8_lossy(&output).trim_end());
                }
                OutputFormat::Json => reports.push(json.to_value(&file, result)),
            }
        }

        if self.args.format == OutputFormat::Json {
            let value = if reports.len() == 1 {
                reports.remove(0)
            } else {
                serde_json::Value::Array(reports)
            };
            let rendered = serde_json::to_string_pretty(&value)
                .map_err(|e| DoctorError::Other(e.into()))?;
            ui.message(&rendered);
        } else if results.len() > 1 {
            let passed = results
                .iter()
                .filter(|(_, r)| r.as_ref().is_ok_and(|r| r.ok))
                .count();
            ui.success(&format!("{} of {} file(s) passed", passed, results.len()));
        }

        if failed {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}
