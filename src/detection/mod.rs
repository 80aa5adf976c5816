//! Dialect detection.

pub mod dialect;

pub use dialect::{detect, detect_document, Dialect, UnknownDialect, PIPELINE_ROOT_MARKERS};
