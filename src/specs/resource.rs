//! Template resource specification.
//!
//! Read from the CloudFormation resource specification JSON shape:
//!
//! ```json
//! {"ResourceTypes": {"AWS::S3::Bucket": {"Properties": {
//!     "BucketName": {"Required": false, "PrimitiveType": "String"},
//!     "Tags": {"Required": false, "Type": "List", "ItemType": "Tag"}
//! }}}}
//! ```

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{SpecDocument, SpecSource};
use crate::document::Document;

/// Scalar property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveType {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    Json,
    Timestamp,
}

impl PrimitiveType {
    /// Parse a `PrimitiveType` name. Unknown names yield `None` and the
    /// property is only checked for presence.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Integer" => Some(Self::Integer),
            "Long" => Some(Self::Long),
            "Double" => Some(Self::Double),
            "Boolean" => Some(Self::Boolean),
            "Json" => Some(Self::Json),
            "Timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::Json => "Json",
            Self::Timestamp => "Timestamp",
        }
    }

    /// Whether `value` is acceptable for this type.
    pub fn accepts(&self, value: &Document) -> bool {
        match self {
            Self::String | Self::Timestamp => value.is_scalar() && !value.is_null(),
            Self::Integer | Self::Long => match value {
                Document::Number(n) => n.is_integer(),
                Document::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Self::Double => match value {
                Document::Number(_) => true,
                Document::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            Self::Boolean => match value {
                Document::Bool(_) => true,
                Document::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "false"),
                _ => false,
            },
            Self::Json => matches!(value, Document::Mapping(_) | Document::String(_)),
        }
    }
}

/// Collection property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerType {
    List,
    Map,
}

impl ContainerType {
    pub fn accepts(&self, value: &Document) -> bool {
        match self {
            Self::List => matches!(value, Document::Sequence(_)),
            Self::Map => matches!(value, Document::Mapping(_)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Map => "Map",
        }
    }
}

/// One property of a resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    pub required: bool,
    pub primitive_type: Option<PrimitiveType>,
    pub container_type: Option<ContainerType>,
    /// Element type of a list or map (`ItemType` or `PrimitiveItemType`).
    pub item_type: Option<String>,
    /// Named structured type (e.g. `VersioningConfiguration`); values must be mappings.
    pub struct_type: Option<String>,
}

impl PropertySpec {
    /// Human description of the expected type.
    pub fn expected(&self) -> Option<String> {
        if let Some(container) = self.container_type {
            return Some(match &self.item_type {
                Some(item) => format!("{} of {}", container.as_str(), item),
                None => container.as_str().to_string(),
            });
        }
        if let Some(primitive) = self.primitive_type {
            return Some(primitive.as_str().to_string());
        }
        self.struct_type.clone()
    }

    /// Whether `value` matches the declared type. Values with no declared
    /// type always match.
    pub fn accepts(&self, value: &Document) -> bool {
        if let Some(container) = self.container_type {
            return container.accepts(value);
        }
        if let Some(primitive) = self.primitive_type {
            return primitive.accepts(value);
        }
        if self.struct_type.is_some() {
            return matches!(value, Document::Mapping(_));
        }
        true
    }
}

/// A resource type and its properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    pub properties: BTreeMap<String, PropertySpec>,
}

impl ResourceType {
    /// Required property names in sorted order.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(k, _)| k.as_str())
    }
}

/// The resource specification used by the template engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSpec {
    pub types: BTreeMap<String, ResourceType>,
    pub source: SpecSource,
}

impl ResourceSpec {
    pub fn get(&self, type_name: &str) -> Option<&ResourceType> {
        self.types.get(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

/// On-disk property shape.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PropertySpecFile {
    #[serde(default)]
    pub required: bool,
    pub primitive_type: Option<String>,
    /// `List`, `Map`, or the name of a structured property type.
    #[serde(rename = "Type")]
    pub type_name: Option<String>,
    pub item_type: Option<String>,
    pub primitive_item_type: Option<String>,
}

/// On-disk resource type shape.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTypeFile {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpecFile>,
}

/// On-disk resource specification shape.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceSpecFile {
    #[serde(default)]
    pub resource_types: BTreeMap<String, ResourceTypeFile>,
}

impl From<PropertySpecFile> for PropertySpec {
    fn from(file: PropertySpecFile) -> Self {
        let (container_type, struct_type) = match file.type_name.as_deref() {
            Some("List") => (Some(ContainerType::List), None),
            Some("Map") => (Some(ContainerType::Map), None),
            Some(other) => (None, Some(other.to_string())),
            None => (None, None),
        };
        PropertySpec {
            required: file.required,
            primitive_type: file.primitive_type.as_deref().and_then(PrimitiveType::parse),
            container_type,
            item_type: file.item_type.or(file.primitive_item_type),
            struct_type,
        }
    }
}

impl SpecDocument for ResourceSpec {
    type File = ResourceSpecFile;

    const KIND: &'static str = "template resource spec";
    const EMBEDDED_FILE: &'static str = "cloudformation.json";

    fn from_file(file: Self::File, source: SpecSource) -> Self {
        let types = file
            .resource_types
            .into_iter()
            .map(|(name, rt)| {
                let properties = rt
                    .properties
                    .into_iter()
                    .map(|(prop, spec)| (prop, PropertySpec::from(spec)))
                    .collect();
                (name, ResourceType { properties })
            })
            .collect();
        ResourceSpec { types, source }
    }

    fn defect(&self) -> Option<&'static str> {
        self.types
            .is_empty()
            .then_some("no entries under ResourceTypes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> ResourceSpec {
        let file: ResourceSpecFile = serde_json::from_str(json).unwrap();
        ResourceSpec::from_file(file, SpecSource::Embedded)
    }

    #[test]
    fn reads_resource_spec_shape() {
        let spec = spec(
            r#"{"ResourceTypes": {"AWS::S3::Bucket": {"Properties": {
                "BucketName": {"Required": true, "PrimitiveType": "String"},
                "Tags": {"Type": "List", "ItemType": "Tag"},
                "Versioning": {"Type": "VersioningConfiguration"}
            }}}}"#,
        );
        let bucket = spec.get("AWS::S3::Bucket").unwrap();
        assert_eq!(bucket.required().collect::<Vec<_>>(), vec!["BucketName"]);

        let tags = &bucket.properties["Tags"];
        assert_eq!(tags.container_type, Some(ContainerType::List));
        assert_eq!(tags.item_type.as_deref(), Some("Tag"));
        assert_eq!(tags.expected().as_deref(), Some("List of Tag"));

        let versioning = &bucket.properties["Versioning"];
        assert_eq!(versioning.struct_type.as_deref(), Some("VersioningConfiguration"));
    }

    #[test]
    fn primitive_acceptance() {
        assert!(PrimitiveType::String.accepts(&Document::Number(crate::document::Number::Int(3))));
        assert!(!PrimitiveType::String.accepts(&Document::Sequence(vec![])));
        assert!(PrimitiveType::Integer.accepts(&Document::from("42")));
        assert!(!PrimitiveType::Integer.accepts(&Document::from("4.2")));
        assert!(PrimitiveType::Double.accepts(&Document::from("4.2")));
        assert!(PrimitiveType::Boolean.accepts(&Document::from("True")));
        assert!(!PrimitiveType::Boolean.accepts(&Document::from("yes")));
        assert!(PrimitiveType::Json.accepts(&Document::Mapping(Default::default())));
        assert!(!PrimitiveType::Json.accepts(&Document::Sequence(vec![])));
    }

    #[test]
    fn untyped_properties_accept_anything() {
        let prop = PropertySpec::default();
        assert!(prop.accepts(&Document::Sequence(vec![])));
        assert_eq!(prop.expected(), None);
    }

    #[test]
    fn unknown_primitive_is_presence_only() {
        let spec = spec(
            r#"{"ResourceTypes": {"X::Y::Z": {"Properties": {"P": {"PrimitiveType": "Blob"}}}}}"#,
        );
        assert_eq!(spec.get("X::Y::Z").unwrap().properties["P"].primitive_type, None);
    }
}
