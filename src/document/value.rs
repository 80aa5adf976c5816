//! The parsed document value.
//!
//! [`Document`] is a closed set of variants so every traversal is an
//! exhaustive `match`. Mappings keep insertion order and string keys.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::path::{DocPath, Segment};

/// A YAML/JSON number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_integer(&self) -> bool {
        match *self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) if v.is_nan() => f.write_str(".nan"),
            Number::Float(v) if v.is_infinite() => {
                f.write_str(if v > 0.0 { ".inf" } else { "-.inf" })
            }
            Number::Float(v) => {
                let s = v.to_string();
                if s.contains(['.', 'e', 'E']) {
                    f.write_str(&s)
                } else {
                    write!(f, "{}.0", s)
                }
            }
        }
    }
}

/// An insertion-ordered mapping with string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Document)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Index of `key` in insertion order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace. A replaced value keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Document) -> Option<Document> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, shifting later entries down.
    pub fn remove(&mut self, key: &str) -> Option<Document> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Rename `from` to `to` in place.
    ///
    /// Returns false when `from` is absent or `to` already exists.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from != to && self.contains_key(to) {
            return false;
        }
        match self.entries.iter_mut().find(|(k, _)| k == from) {
            Some(entry) => {
                entry.0 = to.to_string();
                true
            }
            None => false,
        }
    }
}

impl FromIterator<(String, Document)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Document)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// A parsed YAML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Document>),
    Mapping(Mapping),
}

impl Document {
    /// Short name of the variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "list",
            Document::Mapping(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Document::Sequence(_) | Document::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Document>> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Whether this is a CloudFormation intrinsic function call
    /// (`{Ref: x}`, `{Condition: x}` or `{"Fn::Name": ...}`).
    pub fn is_intrinsic(&self) -> bool {
        match self {
            Document::Mapping(m) if m.len() == 1 => m
                .keys()
                .next()
                .map(|k| k == "Ref" || k == "Condition" || k.starts_with("Fn::"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Resolve a path to a value.
    pub fn pointer(&self, path: &DocPath) -> Option<&Document> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (Segment::Key(k), Document::Mapping(m)) => m.get(k)?,
                (Segment::Index(i), Document::Sequence(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolve a path to a mutable value.
    pub fn pointer_mut(&mut self, path: &DocPath) -> Option<&mut Document> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (Segment::Key(k), Document::Mapping(m)) => m.get_mut(k)?,
                (Segment::Index(i), Document::Sequence(items)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Convert to a JSON value. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(*b),
            Document::Number(Number::Int(i)) => Value::from(*i),
            Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Document::String(s) => Value::String(s.clone()),
            Document::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Document::Mapping(m) => Value::Object(
                m.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Map a short-form tag to its long-form intrinsic key.
fn intrinsic_key(tag: &serde_yaml::value::Tag) -> String {
    let rendered = tag.to_string();
    let name = rendered.trim_start_matches('!');
    match name {
        "Ref" | "Condition" => name.to_string(),
        _ => format!("Fn::{}", name),
    }
}

/// Two distinct YAML keys that become the same string key (`1` and `"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mapping key '{key}' appears twice once keys are read as strings")]
pub struct KeyCollision {
    pub key: String,
}

impl TryFrom<serde_yaml::Value> for Document {
    type Error = KeyCollision;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value;
        Ok(match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Document::Number(Number::Int(i)),
                None => Document::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Document::String(s),
            Value::Sequence(items) => Document::Sequence(
                items
                    .into_iter()
                    .map(Document::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(m) => {
                let mut mapping = Mapping::new();
                for (k, v) in m {
                    let key = yaml_key_to_string(k);
                    if mapping.contains_key(&key) {
                        return Err(KeyCollision { key });
                    }
                    mapping.insert(key, Document::try_from(v)?);
                }
                Document::Mapping(mapping)
            }
            Value::Tagged(tagged) => {
                let tagged = *tagged;
                let key = intrinsic_key(&tagged.tag);
                let mut mapping = Mapping::new();
                mapping.insert(key, Document::try_from(tagged.value)?);
                Document::Mapping(mapping)
            }
        })
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Document::Number(Number::Int(i)),
                None => Document::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Document::String(s),
            Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Object(map) => {
                Document::Mapping(map.into_iter().map(|(k, v)| (k, Document::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Document::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Document::String(s) => serializer.serialize_str(s),
            Document::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Mapping(m) => m.serialize(serializer),
        }
    }
}
