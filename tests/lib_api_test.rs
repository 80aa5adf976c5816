//! Library API tests: end-to-end scenarios and behavioural laws.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use yamldoctor::config::EngineConfig;
use yamldoctor::detection::{detect, Dialect};
use yamldoctor::document::to_yaml_string;
use yamldoctor::lint::{Severity, Source};
use yamldoctor::parser::parse_bounded;
use yamldoctor::security::{guard, GuardOptions, MAX_BYTES, MAX_LINES};
use yamldoctor::shell::FakeRunner;
use yamldoctor::specs::{embedded, load, ResourceSpec, StepSchema};
use yamldoctor::suggest::{
    apply_suggestions, closest, EditOp, PipelineSuggester, Suggester, SuggestionKind,
    TemplateSuggester,
};
use yamldoctor::{DoctorError, ValidateOptions, Validator};

const BUCKET_SPEC: &str = r#"{
  "ResourceTypes": {
    "AWS::S3::Bucket": {
      "Properties": {
        "BucketName": {"Required": true, "PrimitiveType": "String"},
        "Tags": {"Required": false, "Type": "List", "ItemType": "Tag"}
      }
    }
  }
}"#;

fn offline_validator() -> (Validator, Arc<FakeRunner>) {
    let runner = Arc::new(FakeRunner::new());
    let validator = Validator::with_runner(EngineConfig::default(), runner.clone());
    (validator, runner)
}

#[test]
fn template_missing_required_property_is_one_add() {
    let temp = TempDir::new().unwrap();
    let spec_path = temp.path().join("cfn.json");
    fs::write(&spec_path, BUCKET_SPEC).unwrap();

    let content = "Resources:\n  B:\n    Type: AWS::S3::Bucket\n";
    assert_eq!(detect(content, None), Dialect::Template);

    let engine = TemplateSuggester::new(Arc::new(load::<ResourceSpec>(Some(&spec_path))));
    let doc = parse_bounded(content, None).unwrap();
    let analysis = engine.analyze(&doc);

    assert_eq!(analysis.suggestions.len(), 1);
    let suggestion = &analysis.suggestions[0];
    assert_eq!(suggestion.kind, SuggestionKind::Add);
    assert_eq!(suggestion.path, "Resources.B.Properties.BucketName");

    let fixed = apply_suggestions(&engine, content, &[0]).unwrap();
    let reparsed = parse_bounded(&fixed.content, None).unwrap();
    assert!(engine.analyze(&reparsed).suggestions.is_empty());
}

#[test]
fn pipeline_typo_is_one_rename() {
    let content = "steps:\n  - srcipt: echo hi\n";
    assert_eq!(detect(content, None), Dialect::Pipeline);

    let engine = PipelineSuggester::new(Arc::new(embedded::<StepSchema>()));
    let analysis = engine.analyze(&parse_bounded(content, None).unwrap());

    assert_eq!(analysis.suggestions.len(), 1);
    let suggestion = &analysis.suggestions[0];
    assert_eq!(suggestion.kind, SuggestionKind::Rename);
    assert_eq!(suggestion.path, "steps[0].srcipt");
    assert!(matches!(
        &suggestion.fix,
        Some(EditOp::RenameField { from, to, .. }) if from == "srcipt" && to == "script"
    ));

    let fixed = apply_suggestions(&engine, content, &[0]).unwrap();
    assert_eq!(fixed.content, "steps:\n  - script: echo hi\n");
}

#[test]
fn anchor_rejects_before_any_stage() {
    let content = "defaults: &anchor\n  image: app\n";
    let messages = guard(content, &GuardOptions::default());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Error);
    assert!(messages[0].message.contains("anchor"));

    let (validator, runner) = offline_validator();
    let result = validator.validate(content, &ValidateOptions::new());
    assert!(!result.ok);
    assert_eq!(result.messages.len(), 1);
    assert!(runner.calls().is_empty());
}

#[test]
fn malformed_yaml_is_one_parser_error() {
    let (validator, runner) = offline_validator();
    let result = validator.validate("foo: [1\n", &ValidateOptions::new());

    assert!(!result.ok);
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].source, Source::Parser);
    assert_eq!(result.messages[0].severity, Severity::Error);
    assert!(runner.calls().is_empty());
}

#[test]
fn unavailable_style_checker_degrades_to_one_info() {
    let (validator, _) = offline_validator();

    let clean = validator.validate("name: app\n", &ValidateOptions::new());
    assert!(clean.ok);
    assert_eq!(clean.messages.len(), 1);
    assert_eq!(clean.messages[0].source, Source::StyleChecker);
    assert_eq!(clean.messages[0].severity, Severity::Info);

    // ok follows the engine, not the missing tool
    let broken = validator.validate("steps:\n  - script: 1\n", &ValidateOptions::new());
    assert!(!broken.ok);
    assert_eq!(broken.from_source(Source::StyleChecker).count(), 1);
    assert!(broken
        .from_source(Source::DialectSchema)
        .any(|m| m.severity == Severity::Error));
}

#[test]
fn size_and_line_limits_block_the_parser() {
    let (validator, runner) = offline_validator();

    let big = format!("a: \"{}\"\n", "x".repeat(MAX_BYTES));
    let result = validator.validate(&big, &ValidateOptions::new());
    assert!(!result.ok);
    assert!(result.messages.iter().all(|m| m.source == Source::Parser));
    assert!(result.messages.iter().all(|m| m.kind != Some(yamldoctor::lint::MessageKind::Syntax)));

    let tall = "a: 1\n".repeat(MAX_LINES + 1);
    let result = validator.validate(&tall, &ValidateOptions::new());
    assert!(!result.ok);
    assert!(runner.calls().is_empty());
}

#[test]
fn alias_is_rejected_with_or_without_anchor() {
    let with_anchor = "a: &x 1\nb: *x\n";
    let alias_only = "b: *x\n";
    let options = GuardOptions {
        allow_anchors: true,
        ..GuardOptions::default()
    };

    for content in [with_anchor, alias_only] {
        let strict = guard(content, &options);
        assert!(strict.iter().any(|m| m.severity == Severity::Error
            && m.message.to_lowercase().contains("alias")));

        let relaxed = guard(
            content,
            &GuardOptions {
                relax_security: true,
                ..options.clone()
            },
        );
        assert!(relaxed.iter().all(|m| m.severity != Severity::Error));
        assert!(relaxed.iter().any(|m| m.message.to_lowercase().contains("alias")));
    }
}

#[test]
fn applying_nothing_preserves_the_document() {
    let engine = PipelineSuggester::new(Arc::new(embedded::<StepSchema>()));
    let content = "trigger: [main]\nsteps:\n  - srcipt: echo hi\n    displayName: Say hi\n";

    let fixed = apply_suggestions(&engine, content, &[]).unwrap();
    assert!(fixed.applied.is_empty());
    assert_eq!(
        parse_bounded(&fixed.content, None).unwrap(),
        parse_bounded(content, None).unwrap()
    );

    let emitted = to_yaml_string(&parse_bounded(content, None).unwrap());
    assert_eq!(
        parse_bounded(&emitted, None).unwrap(),
        parse_bounded(content, None).unwrap()
    );
}

#[test]
fn fuzzy_rename_is_deterministic() {
    let candidates = ["script", "bash", "pwsh", "powershell", "task", "checkout"];
    let first = closest("scirpt", candidates.iter().copied());
    for _ in 0..10 {
        assert_eq!(closest("scirpt", candidates.iter().copied()), first);
    }
    assert_eq!(first, Some("script"));

    let engine = PipelineSuggester::new(Arc::new(embedded::<StepSchema>()));
    let doc = parse_bounded("steps:\n  - tsak: Npm@1\n", None).unwrap();
    assert_eq!(engine.analyze(&doc), engine.analyze(&doc));
}

#[test]
fn forced_provider_wins_over_detection() {
    let (validator, _) = offline_validator();
    let options = ValidateOptions::new().with_provider(Some(Dialect::Generic));
    let result = validator.validate("steps:\n  - srcipt: echo hi\n", &options);

    assert!(result.ok);
    assert_eq!(result.provider_summary.as_ref().unwrap().provider, Dialect::Generic);
    assert_eq!(result.from_source(Source::DialectSchema).count(), 0);
}

#[test]
fn broken_spec_override_falls_back_to_embedded() {
    let temp = TempDir::new().unwrap();
    let spec_path = temp.path().join("broken.json");
    fs::write(&spec_path, "{ not json").unwrap();

    let config = EngineConfig {
        template_spec: Some(spec_path),
        ..EngineConfig::default()
    };
    let validator = Validator::with_runner(config, Arc::new(FakeRunner::new()));
    let spec = validator.resource_spec();

    assert!(spec.get("AWS::S3::Bucket").is_some());
    assert_eq!(spec.source.to_string(), "embedded");
}

#[test]
fn wrong_shape_spec_override_falls_back_to_embedded() {
    let temp = TempDir::new().unwrap();
    let spec_path = temp.path().join("spec.json");
    fs::write(&spec_path, r#"{"PropertyTypes": {}, "Resources": {}}"#).unwrap();

    let config = EngineConfig {
        template_spec: Some(spec_path),
        ..EngineConfig::default()
    };
    let validator = Validator::with_runner(config, Arc::new(FakeRunner::new()));
    assert_eq!(validator.resource_spec().source.to_string(), "embedded");

    let result = validator.validate(
        "Resources:\n  Q:\n    Type: AWS::SQS::Queue\n",
        &ValidateOptions::new(),
    );
    assert!(!result
        .messages
        .iter()
        .any(|m| m.message.contains("Unknown resource type")));
    let summary = result.provider_summary.unwrap();
    assert_eq!(summary.sources["templateSpec"].as_deref(), Some("embedded"));
}

#[test]
fn binary_file_is_rejected_by_preflight() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("image.yml");
    fs::write(&path, [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0xff, 0xd8]).unwrap();

    let (validator, runner) = offline_validator();
    let result = validator.validate_path(&path, &ValidateOptions::new()).unwrap();

    assert!(!result.ok);
    assert!(result.provider_summary.is_none());
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].source, Source::Parser);
    assert_eq!(result.messages[0].rule_id.as_deref(), Some("security/binary"));
    assert!(runner.calls().is_empty());
}

#[test]
fn keys_colliding_as_strings_fail_parsing() {
    let content = "variables:\n  1: a\n  \"1\": b\nsteps:\n  - srcipt: echo hi\n";

    let (validator, _) = offline_validator();
    let result = validator.validate(content, &ValidateOptions::new());
    assert!(!result.ok);
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].rule_id.as_deref(), Some("syntax"));

    let err = validator
        .apply_suggestions(content, None, &[0])
        .unwrap_err();
    assert!(matches!(err, DoctorError::ParseFailed(_)));
}

#[test]
fn suggestion_entry_points_run_the_guard() {
    let (validator, _) = offline_validator();

    let aliased = "base: &b\n  a: 1\nsteps:\n  - srcipt: *b\n";
    assert!(matches!(
        validator.apply_suggestions(aliased, None, &[0]),
        Err(DoctorError::SecurityRejected { .. })
    ));
    assert!(matches!(
        validator.analyze(aliased, None),
        Err(DoctorError::SecurityRejected { .. })
    ));

    let oversized = format!("steps:\n  - srcipt: \"{}\"\n", "x".repeat(MAX_BYTES));
    assert!(matches!(
        validator.apply_suggestions(&oversized, Some(Dialect::Pipeline), &[0]),
        Err(DoctorError::SecurityRejected { .. })
    ));
}

#[test]
fn parse_timeout_is_one_parser_error_and_skips_checkers() {
    let config = EngineConfig {
        parse_delay_ms: 300,
        ..EngineConfig::default()
    };
    let runner = Arc::new(FakeRunner::new());
    let validator = Validator::with_runner(config, runner.clone());

    let result = validator.validate(
        "steps:\n  - script: make\n",
        &ValidateOptions::new().with_parse_timeout_ms(10),
    );

    assert!(!result.ok);
    assert!(result.provider_summary.is_none());
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].source, Source::Parser);
    assert_eq!(result.messages[0].rule_id.as_deref(), Some("parse-timeout"));
    assert!(result.messages[0].message.contains("timed out after 10 ms"));
    assert!(runner.calls().is_empty());
}
