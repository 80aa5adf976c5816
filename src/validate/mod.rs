//! Validation orchestration.
//!
//! A [`Validator`] owns the engine configuration, the tool runner and the
//! spec caches. Each call runs the stages in order:
//!
//! 1. preflight guard (stops on any error)
//! 2. bounded parse (stops on timeout or syntax error)
//! 3. style checker
//! 4. template rules checker, for templates only
//! 5. dialect engine
//! 6. declarative rules checker, when a ruleset is configured
//!
//! # Example
//!
//! ```no_run
//! use yamldoctor::config::EngineConfig;
//! use yamldoctor::validate::{ValidateOptions, Validator};
//!
//! let validator = Validator::new(EngineConfig::default());
//! let result = validator.validate("steps:\n  - script: make\n", &ValidateOptions::new());
//! println!("ok: {}", result.ok);
//! ```

pub mod options;
pub mod validator;

pub use options::ValidateOptions;
pub use validator::{Validator, SOURCE_PIPELINE_SPEC, SOURCE_RULESET, SOURCE_TEMPLATE_SPEC};
