//! The validation pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::options::ValidateOptions;
use crate::checkers::{run_checker, CheckInput, RulesChecker, StyleChecker, TemplateRulesChecker};
use crate::config::EngineConfig;
use crate::detection::{detect_document, Dialect};
use crate::diff::DiffProducer;
use crate::document::Document;
use crate::error::Result;
use crate::lint::{ProviderSummary, ValidationResult};
use crate::parser::BoundedParser;
use crate::security::{decode, ensure_safe, guard, is_rejected};
use crate::shell::{ProcessRunner, ToolRunner};
use crate::specs::{ResourceSpec, SpecCache, StepSchema};
use crate::suggest::{
    self, Analysis, AppliedFixes, FixPreview, GenericSuggester, PipelineSuggester, Suggester,
    TemplateSuggester,
};

/// Summary source key for the template resource spec.
pub const SOURCE_TEMPLATE_SPEC: &str = "templateSpec";
/// Summary source key for the pipeline step schema.
pub const SOURCE_PIPELINE_SPEC: &str = "pipelineSpec";
/// Summary source key for the declarative ruleset.
pub const SOURCE_RULESET: &str = "ruleset";

/// Runs the guard, the parser, the external checkers and the dialect
/// engines over a document.
///
/// Specs are loaded on first use and shared by every later call, so one
/// validator should serve many documents.
pub struct Validator {
    config: EngineConfig,
    runner: Arc<dyn ToolRunner>,
    resource_spec: SpecCache<ResourceSpec>,
    step_schema: SpecCache<StepSchema>,
}

impl Validator {
    /// A validator that spawns real processes for external checkers.
    pub fn new(config: EngineConfig) -> Self {
        let runner = Arc::new(ProcessRunner::with_timeout(config.checker_timeout()));
        Self::with_runner(config, runner)
    }

    pub fn with_runner(config: EngineConfig, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            resource_spec: SpecCache::new(config.template_spec.clone()),
            step_schema: SpecCache::new(config.pipeline_spec.clone()),
            config,
            runner,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The template resource spec in use.
    pub fn resource_spec(&self) -> Arc<ResourceSpec> {
        self.resource_spec.get()
    }

    /// The pipeline step schema in use.
    pub fn step_schema(&self) -> Arc<StepSchema> {
        self.step_schema.get()
    }

    /// Re-read both specs from their sources.
    pub fn reload_specs(&self) {
        self.resource_spec.reload();
        self.step_schema.reload();
        debug!("Reloaded specs");
    }

    /// Validate one document.
    ///
    /// Only a rejected preflight or a failed parse stops the pipeline early;
    /// checker failures are reported as messages.
    pub fn validate(&self, content: &str, options: &ValidateOptions) -> ValidationResult {
        let mut messages = guard(content, &options.guard_options(&self.config.security));
        if is_rejected(&messages) {
            debug!(messages = messages.len(), "Preflight rejected document");
            return ValidationResult::new(messages, None);
        }

        let doc = match self.parser(options.parse_timeout_ms).parse(content) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(error = %e, "Parse failed");
                messages.push(e.to_message());
                return ValidationResult::new(messages, None);
            }
        };

        let dialect = options.provider.unwrap_or_else(|| detect_document(&doc));
        debug!(%dialect, "Validating document");

        let runner: Arc<dyn ToolRunner> = options
            .tool_runner
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.runner));
        let input = CheckInput::new(content).with_path(options.source_path.as_deref());

        messages.extend(run_checker(&self.style_checker(), runner.as_ref(), &input));

        if dialect == Dialect::Template {
            messages.extend(run_checker(
                &self.template_rules_checker(),
                runner.as_ref(),
                &input,
            ));
        }

        let analysis = self.analyze_suggestions(&doc, dialect);
        debug!(
            messages = analysis.messages.len(),
            suggestions = analysis.suggestions.len(),
            "Dialect engine finished"
        );
        messages.extend(analysis.messages);

        let ruleset = options
            .ruleset_path
            .clone()
            .or_else(|| self.config.rules.ruleset.clone());
        if let Some(ruleset) = &ruleset {
            let checker = RulesChecker::new(ruleset)
                .with_command(&self.config.rules.command)
                .with_timeout(self.config.checker_timeout());
            messages.extend(run_checker(&checker, runner.as_ref(), &input));
        }

        let summary = ProviderSummary::tally(
            dialect,
            self.summary_sources(dialect, ruleset.as_deref()),
            &messages,
        );
        ValidationResult::new(messages, Some(summary))
    }

    /// Read and validate a file.
    ///
    /// `filename` and `source_path` are filled from `path` unless already set.
    /// Content that is not UTF-8 is rejected by the preflight stage, not
    /// reported as a read error.
    pub fn validate_path(&self, path: &Path, options: &ValidateOptions) -> Result<ValidationResult> {
        let bytes = fs::read(path)?;
        let mut options = options.clone();
        if options.filename.is_none() {
            options.filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        if options.source_path.is_none() {
            options.source_path = Some(path.to_path_buf());
        }
        match decode(bytes, &options.guard_options(&self.config.security)) {
            Ok(content) => Ok(self.validate(&content, &options)),
            Err(messages) => {
                debug!(path = %path.display(), "Preflight rejected undecodable file");
                Ok(ValidationResult::new(messages, None))
            }
        }
    }

    /// Validate many files in parallel. Results keep the input order.
    pub fn validate_batch(
        &self,
        paths: &[PathBuf],
        options: &ValidateOptions,
    ) -> Vec<(PathBuf, Result<ValidationResult>)> {
        self.validate_batch_with(paths, options, &|_: &Path| {})
    }

    /// [`validate_batch`](Self::validate_batch), calling `on_done` as each file finishes.
    pub fn validate_batch_with(
        &self,
        paths: &[PathBuf],
        options: &ValidateOptions,
        on_done: &(dyn Fn(&Path) + Sync),
    ) -> Vec<(PathBuf, Result<ValidationResult>)> {
        paths
            .par_iter()
            .map(|path| {
                let result = self.validate_path(path, options);
                on_done(path);
                (path.clone(), result)
            })
            .collect()
    }

    /// The engine for `dialect`, bound to this validator's specs.
    pub fn suggester(&self, dialect: Dialect) -> Box<dyn Suggester> {
        match dialect {
            Dialect::Template => Box::new(TemplateSuggester::new(self.resource_spec.get())),
            Dialect::Pipeline => Box::new(PipelineSuggester::new(self.step_schema.get())),
            Dialect::Generic => Box::new(GenericSuggester),
        }
    }

    pub fn analyze_suggestions(&self, doc: &Document, dialect: Dialect) -> Analysis {
        self.suggester(dialect).analyze(doc)
    }

    /// Guard and parse `content`, then run the engine for the given or
    /// detected dialect.
    pub fn analyze(&self, content: &str, dialect: Option<Dialect>) -> Result<(Dialect, Analysis)> {
        ensure_safe(content, &self.config.security.guard_options())?;
        let doc = self.parser(None).parse(content)?;
        let dialect = dialect.unwrap_or_else(|| detect_document(&doc));
        Ok((dialect, self.analyze_suggestions(&doc, dialect)))
    }

    /// Apply the suggestions at `indices`. The dialect is detected when not given.
    pub fn apply_suggestions(
        &self,
        content: &str,
        dialect: Option<Dialect>,
        indices: &[usize],
    ) -> Result<AppliedFixes> {
        let guard = self.config.security.guard_options();
        ensure_safe(content, &guard)?;
        let dialect = match dialect {
            Some(dialect) => dialect,
            None => detect_document(&self.parser(None).parse(content)?),
        };
        let suggester = self.suggester(dialect);
        suggest::apply_suggestions_with(
            &self.parser(None),
            &guard,
            suggester.as_ref(),
            content,
            indices,
        )
    }

    /// Apply suggestions and diff the result against `content`.
    pub fn preview_suggestions(
        &self,
        content: &str,
        dialect: Option<Dialect>,
        indices: &[usize],
        differ: &dyn DiffProducer,
    ) -> Result<FixPreview> {
        let fixes = self.apply_suggestions(content, dialect, indices)?;
        let diff = differ.diff(content, &fixes.content);
        Ok(FixPreview { fixes, diff })
    }

    /// A parser with the configured budget, or `timeout_ms` when given.
    pub fn parser(&self, timeout_ms: Option<u64>) -> BoundedParser {
        BoundedParser::new(Some(timeout_ms.unwrap_or(self.config.parse_timeout_ms)))
            .with_delay(self.config.parse_delay())
    }

    fn style_checker(&self) -> StyleChecker {
        StyleChecker::new()
            .with_command(&self.config.style.command)
            .with_container(&self.config.container_runtime, &self.config.style.image)
            .with_config(self.config.style.config.clone())
            .with_timeout(self.config.checker_timeout())
    }

    fn template_rules_checker(&self) -> TemplateRulesChecker {
        TemplateRulesChecker::new()
            .with_container(
                &self.config.container_runtime,
                &self.config.template_rules.image,
            )
            .with_timeout(self.config.checker_timeout())
    }

    fn summary_sources(
        &self,
        dialect: Dialect,
        ruleset: Option<&Path>,
    ) -> BTreeMap<String, Option<String>> {
        let template = (dialect == Dialect::Template)
            .then(|| self.resource_spec.get().source.to_string());
        let pipeline = (dialect == Dialect::Pipeline)
            .then(|| self.step_schema.get().source.to_string());

        BTreeMap::from([
            (SOURCE_TEMPLATE_SPEC.to_string(), template),
            (SOURCE_PIPELINE_SPEC.to_string(), pipeline),
            (
                SOURCE_RULESET.to_string(),
                ruleset.map(|p| p.display().to_string()),
            ),
        ])
    }
}
