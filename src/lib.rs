//! yamldoctor - guarded validation, dialect detection and repair
//! suggestions for YAML.
//!
//! yamldoctor validates untrusted YAML written for infrastructure templates
//! (CloudFormation-style), CI pipelines (Azure-Pipelines-style) or neither.
//! A request passes a text-level preflight, a time-bounded parse, external
//! checkers and a dialect engine, and comes back as one message list with a
//! single `ok` verdict. The dialect engines also propose structured fixes
//! that can be applied and previewed as diffs.
//!
//! # Modules
//!
//! - [`security`] - Preflight checks on raw text
//! - [`parser`] - YAML parsing under a wall-clock budget
//! - [`document`] - Tagged document value, paths and emission
//! - [`detection`] - Dialect classification
//! - [`specs`] - Resource spec and step schema loading
//! - [`checkers`] - yamllint, cfn-lint and spectral adapters
//! - [`shell`] - Process execution for external tools
//! - [`suggest`] - Dialect engines, edit operations and fix application
//! - [`validate`] - The validation pipeline
//! - [`lint`] - Message model and output formatting
//! - [`config`] - `.yamldoctor.yml` loading
//! - [`cli`] / [`ui`] - The `yamldoctor` binary
//!
//! # Example
//!
//! ```
//! use yamldoctor::detection::{detect, Dialect};
//! use yamldoctor::suggest::{apply_suggestions, PipelineSuggester};
//! use yamldoctor::specs::{embedded, StepSchema};
//! use std::sync::Arc;
//!
//! let content = "steps:\n  - srcipt: echo hi\n";
//! assert_eq!(detect(content, None), Dialect::Pipeline);
//!
//! let engine = PipelineSuggester::new(Arc::new(embedded::<StepSchema>()));
//! let fixed = apply_suggestions(&engine, content, &[0]).unwrap();
//! assert_eq!(fixed.content, "steps:\n  - script: echo hi\n");
//! ```

pub mod checkers;
pub mod cli;
pub mod config;
pub mod convert;
pub mod detection;
pub mod diff;
pub mod document;
pub mod error;
pub mod lint;
pub mod parser;
pub mod security;
pub mod shell;
pub mod specs;
pub mod suggest;
pub mod ui;
pub mod validate;

pub use detection::Dialect;
pub use error::{DoctorError, Result};
pub use lint::{LintMessage, Severity, Source, ValidationResult};
pub use validate::{ValidateOptions, Validator};
