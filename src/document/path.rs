//! Dot/bracket document pointers.
//!
//! Paths render as `Resources.B.Properties.BucketName` or
//! `jobs[0].steps[1].script`; keys that contain `.`, `[`, `]` or quotes
//! render bracket-quoted (`Outputs["a.b"]`).

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Failure to parse a path string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid document path '{path}': {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A pointer into a [`Document`](super::Document).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<Segment>,
}

impl DocPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extend with a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.into()));
        next
    }

    /// Extend with a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    /// Split off the last segment.
    pub fn split_last(&self) -> Option<(DocPath, &Segment)> {
        let (last, rest) = self.segments.split_last()?;
        Some((
            DocPath {
                segments: rest.to_vec(),
            },
            last,
        ))
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"'])
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
                Segment::Key(k) if needs_brackets(k) => {
                    let quoted = serde_json::to_string(k).map_err(|_| fmt::Error)?;
                    write!(f, "[{}]", quoted)?
                }
                Segment::Key(k) if i == 0 => f.write_str(k)?,
                Segment::Key(k) => write!(f, ".{}", k)?,
            }
        }
        Ok(())
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| PathError {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let chars: Vec<char> = s.chars().collect();
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    } else if !matches!(chars.get(i.wrapping_sub(1)), Some(']')) {
                        return Err(err("empty key"));
                    }
                    i += 1;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                    if chars.get(i + 1) == Some(&'"') {
                        // Quoted key: scan to the closing quote, honouring escapes
                        let start = i + 1;
                        let mut j = start + 1;
                        let mut escaped = false;
                        while j < chars.len() {
                            match chars[j] {
                                '\\' if !escaped => escaped = true,
                                '"' if !escaped => break,
                                _ => escaped = false,
                            }
                            j += 1;
                        }
                        if chars.get(j + 1) != Some(&']') {
                            return Err(err("unterminated quoted key"));
                        }
                        let literal: String = chars[start..=j].iter().collect();
                        let key: String = serde_json::from_str(&literal)
                            .map_err(|_| err("malformed quoted key"))?;
                        segments.push(Segment::Key(key));
                        i = j + 2;
                    } else {
                        let close = chars[i..]
                            .iter()
                            .position(|c| *c == ']')
                            .map(|p| p + i)
                            .ok_or_else(|| err("unterminated index"))?;
                        let digits: String = chars[i + 1..close].iter().collect();
                        let index = digits
                            .parse::<usize>()
                            .map_err(|_| err("index is not a number"))?;
                        segments.push(Segment::Index(index));
                        i = close + 1;
                    }
                }
                c => {
                    current.push(c);
                    i += 1;
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::Key(current));
        } else if s.ends_with('.') {
            return Err(err("trailing dot"));
        }

        Ok(DocPath { segments })
    }
}

impl Serialize for DocPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
