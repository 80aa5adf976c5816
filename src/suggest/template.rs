//! Infrastructure-template engine.
//!
//! Checks every resource under `Resources` against the resource spec:
//! resource type names, required properties, unknown properties and
//! property value types. Intrinsic-function values (`Ref`, `Fn::*`) are
//! resolved at deploy time and are never type-checked.

use std::sync::Arc;

use super::{closest, Analysis, EditOp, Suggester, SuggestionKind};
use crate::document::{DocPath, Document, Mapping};
use crate::lint::Severity;
use crate::specs::{ResourceSpec, ResourceType};

/// Top-level template sections.
const TEMPLATE_SECTIONS: [&str; 10] = [
    "AWSTemplateFormatVersion",
    "Description",
    "Metadata",
    "Parameters",
    "Rules",
    "Mappings",
    "Conditions",
    "Transform",
    "Resources",
    "Outputs",
];

/// Keys a resource entry may carry besides its properties.
const RESOURCE_ATTRIBUTES: [&str; 9] = [
    "Type",
    "Properties",
    "DependsOn",
    "Metadata",
    "Condition",
    "DeletionPolicy",
    "UpdateReplacePolicy",
    "UpdatePolicy",
    "CreationPolicy",
];

fn is_custom_type(type_name: &str) -> bool {
    type_name.starts_with("Custom::") || type_name == "AWS::CloudFormation::CustomResource"
}

/// Template engine bound to one resource spec.
#[derive(Debug, Clone)]
pub struct TemplateSuggester {
    spec: Arc<ResourceSpec>,
}

impl TemplateSuggester {
    pub fn new(spec: Arc<ResourceSpec>) -> Self {
        Self { spec }
    }

    fn check_sections(&self, root: &Mapping, out: &mut Analysis) {
        for key in root.keys() {
            if TEMPLATE_SECTIONS.contains(&key) {
                continue;
            }
            let candidates = TEMPLATE_SECTIONS
                .iter()
                .copied()
                .filter(|section| !root.contains_key(section));
            let path = DocPath::root().key(key);
            match closest(key, candidates) {
                Some(best) => out.suggest(
                    Severity::Warning,
                    "template/unknown-section",
                    SuggestionKind::Rename,
                    &path,
                    format!("Unknown template section '{}'; did you mean '{}'?", key, best),
                    Some(EditOp::RenameField {
                        path: DocPath::root(),
                        from: key.to_string(),
                        to: best.to_string(),
                    }),
                ),
                None => out.report(
                    Severity::Warning,
                    "template/unknown-section",
                    &path,
                    format!("Unknown template section '{}'", key),
                ),
            }
        }
    }

    fn check_resource(&self, name: &str, resource: &Document, out: &mut Analysis) {
        let base = DocPath::root().key("Resources").key(name);

        let Some(entry) = resource.as_mapping() else {
            out.suggest(
                Severity::Error,
                "template/resource-shape",
                SuggestionKind::Type,
                &base,
                format!(
                    "Resource '{}' must be a map, found {}",
                    name,
                    resource.type_name()
                ),
                None,
            );
            return;
        };

        for key in entry.keys() {
            if !RESOURCE_ATTRIBUTES.contains(&key) {
                out.report(
                    Severity::Warning,
                    "template/unknown-attribute",
                    &base.key(key),
                    format!("Resource '{}' has unknown attribute '{}'", name, key),
                );
            }
        }

        let type_name = match entry.get("Type") {
            None => {
                out.suggest(
                    Severity::Error,
                    "template/missing-type",
                    SuggestionKind::Add,
                    &base.key("Type"),
                    format!("Resource '{}' is missing required field 'Type'", name),
                    None,
                );
                return;
            }
            Some(Document::String(t)) => t.as_str(),
            Some(other) => {
                out.suggest(
                    Severity::Error,
                    "template/type-shape",
                    SuggestionKind::Type,
                    &base.key("Type"),
                    format!(
                        "Resource '{}' Type must be a string, found {}",
                        name,
                        other.type_name()
                    ),
                    None,
                );
                return;
            }
        };

        if is_custom_type(type_name) {
            return;
        }

        let Some(resource_type) = self.spec.get(type_name) else {
            let type_path = base.key("Type");
            match closest(type_name, self.spec.type_names()) {
                Some(best) => out.suggest(
                    Severity::Error,
                    "template/unknown-type",
                    SuggestionKind::Rename,
                    &type_path,
                    format!(
                        "Unknown resource type '{}'; did you mean '{}'?",
                        type_name, best
                    ),
                    Some(EditOp::SetField {
                        path: type_path.clone(),
                        value: Document::from(best),
                    }),
                ),
                None => out.report(
                    Severity::Error,
                    "template/unknown-type",
                    &type_path,
                    format!("Unknown resource type '{}'", type_name),
                ),
            }
            return;
        };

        self.check_properties(name, &base, entry.get("Properties"), resource_type, out);
    }

    fn check_properties(
        &self,
        name: &str,
        base: &DocPath,
        properties: Option<&Document>,
        resource_type: &ResourceType,
        out: &mut Analysis,
    ) {
        let props_path = base.key("Properties");
        let empty = Mapping::new();
        let props = match properties {
            None | Some(Document::Null) => &empty,
            Some(Document::Mapping(m)) => m,
            // Fn::If and friends can produce the whole block
            Some(value) if value.is_intrinsic() => return,
            Some(value) => {
                out.suggest(
                    Severity::Error,
                    "template/properties-shape",
                    SuggestionKind::Type,
                    &props_path,
                    format!(
                        "Properties of '{}' must be a map, found {}",
                        name,
                        value.type_name()
                    ),
                    None,
                );
                return;
            }
        };

        for required in resource_type.required() {
            if !props.contains_key(required) {
                let path = props_path.key(required);
                out.suggest(
                    Severity::Error,
                    "template/missing-property",
                    SuggestionKind::Add,
                    &path,
                    format!(
                        "Resource '{}' is missing required property '{}'",
                        name, required
                    ),
                    Some(EditOp::SetField {
                        path: path.clone(),
                        value: Document::Null,
                    }),
                );
            }
        }

        for (key, value) in props.iter() {
            let path = props_path.key(key);
            let Some(prop) = resource_type.properties.get(key) else {
                let candidates = resource_type
                    .properties
                    .keys()
                    .map(String::as_str)
                    .filter(|candidate| !props.contains_key(candidate));
                match closest(key, candidates) {
                    Some(best) => out.suggest(
                        Severity::Warning,
                        "template/unknown-property",
                        SuggestionKind::Rename,
                        &path,
                        format!(
                            "Unknown property '{}' on '{}'; did you mean '{}'?",
                            key, name, best
                        ),
                        Some(EditOp::RenameField {
                            path: props_path.clone(),
                            from: key.to_string(),
                            to: best.to_string(),
                        }),
                    ),
                    None => out.report(
                        Severity::Warning,
                        "template/unknown-property",
                        &path,
                        format!("Unknown property '{}' on '{}'", key, name),
                    ),
                }
                continue;
            };

            if value.is_intrinsic() || prop.accepts(value) {
                continue;
            }
            let expected = prop.expected().unwrap_or_else(|| "a value".to_string());
            out.suggest(
                Severity::Error,
                "template/property-type",
                SuggestionKind::Type,
                &path,
                format!(
                    "Property '{}' on '{}' should be {}, found {}",
                    key,
                    name,
                    expected,
                    value.type_name()
                ),
                None,
            );
        }
    }
}

impl Suggester for TemplateSuggester {
    fn analyze(&self, doc: &Document) -> Analysis {
        let mut out = Analysis::default();
        let Some(root) = doc.as_mapping() else {
            return out;
        };

        self.check_sections(root, &mut out);

        if let Some(resources) = root.get("Resources").and_then(Document::as_mapping) {
            for (name, resource) in resources.iter() {
                self.check_resource(name, resource, &mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::Source;
    use crate::parser::parse_document;
    use crate::specs::{ResourceSpecFile, SpecDocument, SpecSource};

    const SPEC: &str = r#"{"ResourceTypes": {
        "AWS::S3::Bucket": {"Properties": {
            "BucketName": {"Required": true, "PrimitiveType": "String"},
            "Tags": {"Type": "List", "ItemType": "Tag"},
            "ObjectLockEnabled": {"PrimitiveType": "Boolean"}
        }},
        "AWS::SQS::Queue": {"Properties": {
            "DelaySeconds": {"PrimitiveType": "Integer"}
        }}
    }}"#;

    fn engine() -> TemplateSuggester {
        let file: ResourceSpecFile = serde_json::from_str(SPEC).unwrap();
        TemplateSuggester::new(Arc::new(ResourceSpec::from_file(file, SpecSource::Embedded)))
    }

    fn analyze(src: &str) -> Analysis {
        engine().analyze(&parse_document(src).unwrap())
    }

    #[test]
    fn missing_required_property_is_add() {
        let a = analyze("Resources:\n  B:\n    Type: AWS::S3::Bucket\n");
        assert_eq!(a.suggestions.len(), 1);
        let s = &a.suggestions[0];
        assert_eq!(s.kind, SuggestionKind::Add);
        assert_eq!(s.path, "Resources.B.Properties.BucketName");
        assert!(s.has_fix());
        assert_eq!(a.messages.len(), 1);
        assert_eq!(a.messages[0].source, Source::DialectSchema);
        assert_eq!(a.messages[0].severity, Severity::Error);
    }

    #[test]
    fn missing_type_is_add_without_fix() {
        let a = analyze("Resources:\n  B:\n    Properties: {}\n");
        assert_eq!(a.suggestions.len(), 1);
        assert_eq!(a.suggestions[0].kind, SuggestionKind::Add);
        assert_eq!(a.suggestions[0].path, "Resources.B.Type");
        assert!(!a.suggestions[0].has_fix());
    }

    #[test]
    fn unknown_type_is_renamed() {
        let a = analyze("Resources:\n  Q:\n    Type: AWS::SQS::Queu\n");
        assert_eq!(a.suggestions.len(), 1);
        let s = &a.suggestions[0];
        assert_eq!(s.kind, SuggestionKind::Rename);
        assert_eq!(
            s.fix,
            Some(EditOp::SetField {
                path: "Resources.Q.Type".parse().unwrap(),
                value: Document::from("AWS::SQS::Queue"),
            })
        );
    }

    #[test]
    fn custom_resources_are_accepted() {
        let a = analyze("Resources:\n  C:\n    Type: Custom::Thing\n    Properties:\n      Anything: 1\n");
        assert!(a.is_empty());
    }

    #[test]
    fn unknown_property_is_renamed() {
        let a = analyze(
            "Resources:\n  B:\n    Type: AWS::S3::Bucket\n    Properties:\n      BucketName: b\n      Tgas: []\n",
        );
        assert_eq!(a.suggestions.len(), 1);
        let s = &a.suggestions[0];
        assert_eq!(s.path, "Resources.B.Properties.Tgas");
        assert_eq!(
            s.fix,
            Some(EditOp::RenameField {
                path: "Resources.B.Properties".parse().unwrap(),
                from: "Tgas".into(),
                to: "Tags".into(),
            })
        );
        assert_eq!(a.messages[0].severity, Severity::Warning);
    }

    #[test]
    fn wrong_types_are_flagged() {
        let a = analyze(
            "Resources:\n  B:\n    Type: AWS::S3::Bucket\n    Properties:\n      BucketName: [a]\n      Tags: {}\n      ObjectLockEnabled: \"true\"\n",
        );
        let kinds: Vec<_> = a.suggestions.iter().map(|s| (s.kind, s.path.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (SuggestionKind::Type, "Resources.B.Properties.BucketName"),
                (SuggestionKind::Type, "Resources.B.Properties.Tags"),
            ]
        );
    }

    #[test]
    fn intrinsics_skip_type_checks() {
        let a = analyze(
            "Resources:\n  B:\n    Type: AWS::S3::Bucket\n    Properties:\n      BucketName: !Sub '${AWS::StackName}-b'\n      Tags: !Ref TagList\n",
        );
        assert!(a.is_empty(), "{:?}", a);
    }

    #[test]
    fn unknown_attributes_warn_only() {
        let a = analyze(
            "Resources:\n  B:\n    Type: AWS::S3::Bucket\n    Properties:\n      BucketName: b\n    DependOn: X\n",
        );
        assert!(a.suggestions.is_empty());
        assert_eq!(a.messages.len(), 1);
        assert_eq!(a.messages[0].severity, Severity::Warning);
    }

    #[test]
    fn unknown_section_is_renamed() {
        let a = analyze("Resource:\n  B:\n    Type: AWS::S3::Bucket\nResources: {}\n");
        assert_eq!(a.suggestions.len(), 1);
        assert_eq!(a.suggestions[0].path, "Resource");
        assert_eq!(a.suggestions[0].kind, SuggestionKind::Rename);
        match &a.suggestions[0].fix {
            Some(EditOp::RenameField { to, .. }) => assert_ne!(to, "Resources"),
            other => panic!("unexpected fix {:?}", other),
        }
    }

    #[test]
    fn rename_suggestions_are_deterministic() {
        let src = "Resources:\n  Q:\n    Type: AWS::SQS::Queue\n    Properties:\n      DelaySecs: 5\n";
        let first = analyze(src);
        for _ in 0..5 {
            assert_eq!(analyze(src), first);
        }
    }
}
