//! YAML parsing under a wall-clock budget.

pub mod bounded;

pub use bounded::{
    clamp_timeout, parse_bounded, parse_document, BoundedParser, ParseError, DEFAULT_TIMEOUT_MS,
    MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
};
