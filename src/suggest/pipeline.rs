//! Pipeline engine.
//!
//! Checks root keys and every steps list (`steps`, `jobs[i].steps`,
//! `stages[i].jobs[j].steps`). Each step must carry exactly one
//! discriminator key (`script`, `task`, `checkout`, ...) naming its kind.

use std::sync::Arc;

use super::{closest, Analysis, EditOp, Suggester, SuggestionKind};
use crate::document::{DocPath, Document, Mapping};
use crate::lint::Severity;
use crate::specs::StepSchema;

/// Discriminators whose value is an inline script.
const SCRIPT_KEYS: [&str; 4] = ["script", "bash", "powershell", "pwsh"];

/// Discriminators whose value is a reference string.
const REFERENCE_KEYS: [&str; 3] = ["task", "checkout", "template"];

/// Pipeline engine bound to one step schema.
#[derive(Debug, Clone)]
pub struct PipelineSuggester {
    schema: Arc<StepSchema>,
}

impl PipelineSuggester {
    pub fn new(schema: Arc<StepSchema>) -> Self {
        Self { schema }
    }

    fn check_root_keys(&self, root: &Mapping, out: &mut Analysis) {
        if self.schema.allowed_root_keys.is_empty() {
            return;
        }
        for key in root.keys() {
            if self.schema.is_root_key(key) {
                continue;
            }
            let candidates = self
                .schema
                .allowed_root_keys
                .iter()
                .map(String::as_str)
                .filter(|candidate| !root.contains_key(candidate));
            let path = DocPath::root().key(key);
            match closest(key, candidates) {
                Some(best) => out.suggest(
                    Severity::Warning,
                    "pipeline/unknown-root-key",
                    SuggestionKind::Rename,
                    &path,
                    format!("Unknown pipeline key '{}'; did you mean '{}'?", key, best),
                    Some(EditOp::RenameField {
                        path: DocPath::root(),
                        from: key.to_string(),
                        to: best.to_string(),
                    }),
                ),
                None => out.report(
                    Severity::Warning,
                    "pipeline/unknown-root-key",
                    &path,
                    format!("Unknown pipeline key '{}'", key),
                ),
            }
        }
    }

    fn check_jobs(&self, jobs: &Document, base: &DocPath, out: &mut Analysis) {
        let jobs_path = base.key("jobs");
        let Some(items) = jobs.as_sequence() else {
            if !jobs.is_null() {
                out.suggest(
                    Severity::Error,
                    "pipeline/jobs-shape",
                    SuggestionKind::Type,
                    &jobs_path,
                    format!("'jobs' must be a list, found {}", jobs.type_name()),
                    None,
                );
            }
            return;
        };

        for (i, job) in items.iter().enumerate() {
            let job_path = jobs_path.index(i);
            let Some(job_map) = job.as_mapping() else {
                continue;
            };
            match job_map.get("steps") {
                Some(steps) => self.check_steps(steps, &job_path.key("steps"), out),
                None if job_map.contains_key("template") || job_map.contains_key("strategy") => {}
                None => {
                    let steps_path = job_path.key("steps");
                    out.suggest(
                        Severity::Warning,
                        "pipeline/missing-steps",
                        SuggestionKind::Add,
                        &steps_path,
                        format!("Job {} has no steps", job_label(job_map, i)),
                        Some(EditOp::SetField {
                            path: steps_path.clone(),
                            value: Document::Sequence(Vec::new()),
                        }),
                    );
                }
            }
        }
    }

    fn check_stages(&self, stages: &Document, out: &mut Analysis) {
        let Some(items) = stages.as_sequence() else {
            return;
        };
        let stages_path = DocPath::root().key("stages");
        for (i, stage) in items.iter().enumerate() {
            if let Some(jobs) = stage.get("jobs") {
                self.check_jobs(jobs, &stages_path.index(i), out);
            }
        }
    }

    fn check_steps(&self, steps: &Document, path: &DocPath, out: &mut Analysis) {
        let Some(items) = steps.as_sequence() else {
            if !steps.is_null() {
                out.suggest(
                    Severity::Error,
                    "pipeline/steps-shape",
                    SuggestionKind::Type,
                    path,
                    format!("'steps' must be a list, found {}", steps.type_name()),
                    None,
                );
            }
            return;
        };

        for (i, step) in items.iter().enumerate() {
            self.check_step(step, &path.index(i), out);
        }
    }

    fn check_step(&self, step: &Document, path: &DocPath, out: &mut Analysis) {
        let step_map = match step {
            Document::Null => None,
            Document::Mapping(m) if m.is_empty() => None,
            Document::Mapping(m) => Some(m),
            other => {
                out.suggest(
                    Severity::Error,
                    "pipeline/step-shape",
                    SuggestionKind::Type,
                    path,
                    format!("Step {} must be a map, found {}", path, other.type_name()),
                    None,
                );
                return;
            }
        };

        let Some(step_map) = step_map else {
            self.suggest_discriminator(path, format!("Step {} is empty", path), out);
            return;
        };

        let discriminators: Vec<&str> = step_map
            .keys()
            .filter(|k| self.schema.is_step_key(k))
            .collect();

        let mut renamed: Option<&str> = None;
        match discriminators.as_slice() {
            [] => {
                let typo = step_map
                    .keys()
                    .find(|k| !StepSchema::is_common_property(k));
                match typo {
                    Some(key) => {
                        renamed = Some(key);
                        self.suggest_step_key(key, path, out);
                    }
                    None => self.suggest_discriminator(
                        path,
                        format!("Step {} has no step type", path),
                        out,
                    ),
                }
            }
            [_] => {}
            many => out.report(
                Severity::Error,
                "pipeline/multiple-step-types",
                path,
                format!("Step {} has more than one step type ({})", path, many.join(", ")),
            ),
        }

        for (key, value) in step_map.iter() {
            self.check_value_type(key, value, &path.key(key), out);
        }

        for key in step_map.keys() {
            if Some(key) == renamed
                || self.schema.is_step_key(key)
                || self.schema.is_step_property(key)
            {
                continue;
            }
            let candidates = self
                .schema
                .step_properties
                .iter()
                .map(String::as_str)
                .filter(|candidate| !step_map.contains_key(candidate));
            let key_path = path.key(key);
            match closest(key, candidates) {
                Some(best) => out.suggest(
                    Severity::Warning,
                    "pipeline/unknown-step-property",
                    SuggestionKind::Rename,
                    &key_path,
                    format!("Unknown step property '{}'; did you mean '{}'?", key, best),
                    Some(EditOp::RenameField {
                        path: path.clone(),
                        from: key.to_string(),
                        to: best.to_string(),
                    }),
                ),
                None => out.report(
                    Severity::Warning,
                    "pipeline/unknown-step-property",
                    &key_path,
                    format!("Unknown step property '{}'", key),
                ),
            }
        }
    }

    /// A step with no usable key: propose an empty `script`.
    fn suggest_discriminator(&self, path: &DocPath, message: String, out: &mut Analysis) {
        let target = path.key("script");
        out.suggest(
            Severity::Error,
            "pipeline/missing-step-type",
            SuggestionKind::Add,
            &target,
            message,
            Some(EditOp::SetField {
                path: target.clone(),
                value: Document::Null,
            }),
        );
    }

    /// A step whose kind key looks like a typo of a known one.
    fn suggest_step_key(&self, key: &str, path: &DocPath, out: &mut Analysis) {
        let key_path = path.key(key);
        let candidates = self.schema.known_step_keys.iter().map(String::as_str);
        match closest(key, candidates) {
            Some(best) => out.suggest(
                Severity::Error,
                "pipeline/unknown-step-type",
                SuggestionKind::Rename,
                &key_path,
                format!("Unknown step type '{}'; did you mean '{}'?", key, best),
                Some(EditOp::RenameField {
                    path: path.clone(),
                    from: key.to_string(),
                    to: best.to_string(),
                }),
            ),
            None => out.report(
                Severity::Error,
                "pipeline/unknown-step-type",
                &key_path,
                format!("Unknown step type '{}'", key),
            ),
        }
    }

    fn check_value_type(&self, key: &str, value: &Document, path: &DocPath, out: &mut Analysis) {
        let expected = if SCRIPT_KEYS.contains(&key) || REFERENCE_KEYS.contains(&key) {
            if matches!(value, Document::String(_)) {
                return;
            }
            "a string"
        } else if key == "inputs" {
            if matches!(value, Document::Mapping(_)) {
                return;
            }
            "a map"
        } else {
            return;
        };

        out.suggest(
            Severity::Error,
            "pipeline/step-value-type",
            SuggestionKind::Type,
            path,
            format!("'{}' should be {}, found {}", key, expected, value.type_name()),
            None,
        );
    }
}

fn job_label(job: &Mapping, index: usize) -> String {
    job.get("job")
        .or_else(|| job.get("deployment"))
        .and_then(Document::as_str)
        .map(|name| format!("'{}'", name))
        .unwrap_or_else(|| format!("#{}", index))
}

impl Suggester for PipelineSuggester {
    fn analyze(&self, doc: &Document) -> Analysis {
        let mut out = Analysis::default();
        let Some(root) = doc.as_mapping() else {
            return out;
        };

        self.check_root_keys(root, &mut out);

        if let Some(steps) = root.get("steps") {
            self.check_steps(steps, &DocPath::root().key("steps"), &mut out);
        }
        if let Some(jobs) = root.get("jobs") {
            self.check_jobs(jobs, &DocPath::root(), &mut out);
        }
        if let Some(stages) = root.get("stages") {
            self.check_stages(stages, &mut out);
        }
        out
    }
}
