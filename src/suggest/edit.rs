//! Serializable document edits.
//!
//! Every fix a suggestion carries is an [`EditOp`]. [`apply`] is the only
//! code that mutates a document on a suggestion's behalf.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::document::{DocPath, Document, Mapping, Segment};

/// One edit to a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditOp {
    /// Set the field at `path`, creating missing or null parent mappings.
    SetField { path: DocPath, value: Document },

    /// Rename key `from` to `to` in the mapping at `path`, keeping its position.
    RenameField {
        path: DocPath,
        from: String,
        to: String,
    },

    /// Insert into the sequence at `path`; `index` is clamped to its length.
    InsertElement {
        path: DocPath,
        index: usize,
        value: Document,
    },
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::SetField { path, .. } => write!(f, "set {}", path),
            EditOp::RenameField { path, from, to } if path.is_root() => {
                write!(f, "rename {} to {}", from, to)
            }
            EditOp::RenameField { path, from, to } => {
                write!(f, "rename {} to {} in {}", from, to, path)
            }
            EditOp::InsertElement { path, index, .. } => {
                write!(f, "insert at {}[{}]", path, index)
            }
        }
    }
}

/// Why an edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no value at '{path}'")]
    NotFound { path: String },

    #[error("'{path}' is not a mapping")]
    NotAMapping { path: String },

    #[error("'{path}' is not a list")]
    NotASequence { path: String },

    #[error("index {index} is out of range at '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("key '{key}' not found at '{path}'")]
    KeyMissing { path: String, key: String },

    #[error("key '{key}' already exists at '{path}'")]
    KeyExists { path: String, key: String },
}

fn display(path: &DocPath) -> String {
    if path.is_root() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

/// Walk `segments`, turning absent or null mapping slots into mappings.
fn walk_create<'a>(
    node: &'a mut Document,
    segments: &[Segment],
    walked: DocPath,
) -> Result<&'a mut Document, EditError> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(node);
    };

    match first {
        Segment::Key(key) => {
            if node.is_null() {
                *node = Document::Mapping(Mapping::new());
            }
            let here = walked.key(key.clone());
            let map = node.as_mapping_mut().ok_or_else(|| EditError::NotAMapping {
                path: display(&walked),
            })?;
            if !map.contains_key(key) {
                map.insert(key.clone(), Document::Null);
            }
            let child = map.get_mut(key).ok_or_else(|| EditError::NotFound {
                path: display(&here),
            })?;
            walk_create(child, rest, here)
        }
        Segment::Index(index) => {
            let seq = node.as_sequence_mut().ok_or_else(|| EditError::NotASequence {
                path: display(&walked),
            })?;
            let len = seq.len();
            let child = seq.get_mut(*index).ok_or_else(|| EditError::IndexOutOfRange {
                path: display(&walked),
                index: *index,
                len,
            })?;
            walk_create(child, rest, walked.index(*index))
        }
    }
}

/// Apply one edit in place. On error the document is left as it was.
pub fn apply(doc: &mut Document, op: &EditOp) -> Result<(), EditError> {
    match op {
        EditOp::SetField { path, value } => {
            let Some((parent_path, last)) = path.split_last() else {
                *doc = value.clone();
                return Ok(());
            };
            // Validate first so a failing edit leaves no half-created parents
            check_set_target(doc, &parent_path, last)?;
            let parent = walk_create(doc, parent_path.segments(), DocPath::root())?;
            match last {
                Segment::Key(key) => {
                    if parent.is_null() {
                        *parent = Document::Mapping(Mapping::new());
                    }
                    let map = parent.as_mapping_mut().ok_or_else(|| EditError::NotAMapping {
                        path: display(&parent_path),
                    })?;
                    map.insert(key.clone(), value.clone());
                    Ok(())
                }
                Segment::Index(index) => {
                    let seq = parent.as_sequence_mut().ok_or_else(|| EditError::NotASequence {
                        path: display(&parent_path),
                    })?;
                    let len = seq.len();
                    let slot = seq.get_mut(*index).ok_or_else(|| EditError::IndexOutOfRange {
                        path: display(&parent_path),
                        index: *index,
                        len,
                    })?;
                    *slot = value.clone();
                    Ok(())
                }
            }
        }
        EditOp::RenameField { path, from, to } => {
            let target = doc.pointer_mut(path).ok_or_else(|| EditError::NotFound {
                path: display(path),
            })?;
            let map = target.as_mapping_mut().ok_or_else(|| EditError::NotAMapping {
                path: display(path),
            })?;
            if !map.contains_key(from) {
                return Err(EditError::KeyMissing {
                    path: display(path),
                    key: from.clone(),
                });
            }
            if from != to && map.contains_key(to) {
                return Err(EditError::KeyExists {
                    path: display(path),
                    key: to.clone(),
                });
            }
            map.rename(from, to);
            Ok(())
        }
        EditOp::InsertElement { path, index, value } => {
            let target = doc.pointer_mut(path).ok_or_else(|| EditError::NotFound {
                path: display(path),
            })?;
            if target.is_null() {
                *target = Document::Sequence(Vec::new());
            }
            let seq = target.as_sequence_mut().ok_or_else(|| EditError::NotASequence {
                path: display(path),
            })?;
            let at = (*index).min(seq.len());
            seq.insert(at, value.clone());
            Ok(())
        }
    }
}

/// Dry-run the walk a `SetField` would take, without creating anything.
fn check_set_target(doc: &Document, parent: &DocPath, last: &Segment) -> Result<(), EditError> {
    let mut node = Some(doc);
    let mut walked = DocPath::root();

    for segment in parent.segments() {
        let Some(current) = node else {
            // Everything below a missing key gets created as mappings
            return match segment {
                Segment::Key(_) => Ok(()),
                Segment::Index(_) => Err(EditError::NotFound {
                    path: display(&walked),
                }),
            };
        };
        node = match (segment, current) {
            (Segment::Key(k), Document::Mapping(m)) => m.get(k),
            (Segment::Key(_), Document::Null) => None,
            (Segment::Key(_), _) => {
                return Err(EditError::NotAMapping {
                    path: display(&walked),
                })
            }
            (Segment::Index(i), Document::Sequence(items)) => match items.get(*i) {
                Some(item) => Some(item),
                None => {
                    return Err(EditError::IndexOutOfRange {
                        path: display(&walked),
                        index: *i,
                        len: items.len(),
                    })
                }
            },
            (Segment::Index(_), _) => {
                return Err(EditError::NotASequence {
                    path: display(&walked),
                })
            }
        };
        walked = match segment {
            Segment::Key(k) => walked.key(k.clone()),
            Segment::Index(i) => walked.index(*i),
        };
    }

    match (last, node) {
        (_, None) | (Segment::Key(_), Some(Document::Null)) => match last {
            Segment::Key(_) => Ok(()),
            Segment::Index(_) => Err(EditError::NotASequence {
                path: display(parent),
            }),
        },
        (Segment::Key(_), Some(Document::Mapping(_))) => Ok(()),
        (Segment::Key(_), Some(_)) => Err(EditError::NotAMapping {
            path: display(parent),
        }),
        (Segment::Index(i), Some(Document::Sequence(items))) if *i < items.len() => Ok(()),
        (Segment::Index(i), Some(Document::Sequence(items))) => Err(EditError::IndexOutOfRange {
            path: display(parent),
            index: *i,
            len: items.len(),
        }),
        (Segment::Index(_), Some(_)) => Err(EditError::NotASequence {
            path: display(parent),
        }),
    }
}
