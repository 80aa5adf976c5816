//! Parsed document model.
//!
//! - [`Document`] - tagged-variant value every engine traverses
//! - [`DocPath`] - dot/bracket pointers used in messages and edits
//! - [`to_yaml_string`] - deterministic block-style emitter

pub mod emit;
pub mod path;
pub mod value;

pub use emit::to_yaml_string;
pub use path::{DocPath, PathError, Segment};
pub use value::{Document, KeyCollision, Mapping, Number};
