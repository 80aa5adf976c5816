//! Message model and result formatting.
//!
//! Every validation stage reports in one vocabulary:
//!
//! - **Messages** - [`LintMessage`] with a [`Source`], [`Severity`] and
//!   optional location, rule id and suggestion
//! - **Results** - [`ValidationResult`] aggregates messages and derives `ok`
//! - **Summaries** - [`ProviderSummary`] tallies messages per source
//! - **Formatters** - render results for terminals or tooling
//!
//! # Example
//!
//! ```
//! use yamldoctor::lint::{LintMessage, Severity, Source, ValidationResult};
//!
//! let result = ValidationResult::new(
//!     vec![LintMessage::warning(Source::StyleChecker, "line too long")],
//!     None,
//! );
//!
//! // Only errors make a result invalid
//! assert!(result.ok);
//! assert!(Severity::Warning < Severity::Error);
//! ```

pub mod message;
pub mod output;
pub mod result;

pub use message::{LintMessage, MessageKind, Severity, Source};
pub use output::{HumanFormatter, JsonFormatter, LintFormatter, OutputFormat};
pub use result::{ProviderSummary, SeverityCounts, ValidationResult};
