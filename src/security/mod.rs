//! Preflight security checks.
//!
//! Untrusted YAML is inspected as text before parsing: oversized or binary
//! content, JSON in disguise, anchors/aliases and unsafe tags are all
//! reported here so neither the parser nor any external tool ever sees
//! them.

pub mod guard;
mod patterns;

pub use guard::{
    decode, ensure_safe, ensure_safe_bytes, guard, is_rejected, GuardOptions,
    CLOUDFORMATION_TAGS, MAX_BYTES, MAX_LINES,
};
