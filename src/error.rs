//! Error types for yamldoctor operations.
//!
//! This module defines [`DoctorError`], the primary error type used throughout
//! the library, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Only security rejections and parse failures stop a validation early;
//!   the orchestrator turns every other failure into a message
//! - Use `DoctorError` for failures a caller needs to tell apart
//! - Use `anyhow::Error` (via `DoctorError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::ParseError;

/// Core error type for yamldoctor operations.
#[derive(Debug, Error)]
pub enum DoctorError {
    /// The preflight guard refused the input.
    #[error("Input rejected by preflight checks: {reasons}")]
    SecurityRejected { reasons: String },

    /// The document could not be parsed in time or at all.
    #[error(transparent)]
    ParseFailed(#[from] ParseError),

    /// An external checker could not be launched.
    #[error("Checker '{checker}' unavailable: {message}")]
    CheckerUnavailable { checker: String, message: String },

    /// An external checker produced output we could not read.
    #[error("Failed to parse output of checker '{checker}': {message}")]
    CheckerOutputMalformed { checker: String, message: String },

    /// A reference spec could not be read or decoded.
    #[error("Spec unavailable at {path}: {message}")]
    SpecUnavailable { path: PathBuf, message: String },

    /// Configuration file could not be read or decoded.
    #[error("Failed to load config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Caller-supplied input was not usable.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for yamldoctor operations.
pub type Result<T> = std::result::Result<T, DoctorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_rejected_displays_reasons() {
        let err = DoctorError::SecurityRejected {
            reasons: "anchors are not allowed".into(),
        };
        assert!(err.to_string().contains("anchors are not allowed"));
    }

    #[test]
    fn parse_failure_is_transparent() {
        let err: DoctorError = ParseError::Timeout { timeout_ms: 25 }.into();
        assert!(matches!(err, DoctorError::ParseFailed(_)));
        assert!(err.to_string().contains("25"));
    }

    #[test]
    fn checker_unavailable_displays_checker_and_message() {
        let err = DoctorError::CheckerUnavailable {
            checker: "yamllint".into(),
            message: "not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("yamllint"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn spec_unavailable_displays_path() {
        let err = DoctorError::SpecUnavailable {
            path: PathBuf::from("/specs/cfn.json"),
            message: "missing".into(),
        };
        assert!(err.to_string().contains("/specs/cfn.json"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: DoctorError = io_err.into();
        assert!(matches!(err, DoctorError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(DoctorError::InvalidInput {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
