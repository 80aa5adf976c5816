//! Integration tests for the yamldoctor binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Points every external checker at binaries that do not exist, so tests
/// never depend on yamllint, docker or spectral being installed.
const OFFLINE_CONFIG: &str = r#"
container_runtime: yamldoctor-test-no-such-runtime
checker_timeout_ms: 2000
style:
  command: yamldoctor-test-no-such-yamllint
rules:
  command: yamldoctor-test-no-such-spectral
"#;

fn setup_project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".yamldoctor.yml"), OFFLINE_CONFIG).unwrap();
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    temp
}

fn yamldoctor(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("yamldoctor"));
    cmd.current_dir(temp.path())
        .env_remove("YAMLDOCTOR_TEMPLATE_SPEC")
        .env_remove("YAMLDOCTOR_PIPELINE_SPEC")
        .env_remove("YAMLDOCTOR_PARSE_TIMEOUT_MS")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("yamldoctor"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("suggest"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("yamldoctor"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn validate_clean_pipeline_passes() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "steps:\n  - script: make\n")]);
    yamldoctor(&temp)
        .args(["validate", "ci.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("validated as pipeline"))
        .stdout(predicate::str::contains("unavailable"));
    Ok(())
}

#[test]
fn validate_anchor_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "base: &b\n  a: 1\n")]);
    yamldoctor(&temp)
        .args(["validate", "ci.yml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("anchor"));
    Ok(())
}

#[test]
fn validate_allow_anchors_flag() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "base: &b\n  a: 1\n")]);
    yamldoctor(&temp)
        .args(["validate", "ci.yml", "--allow-anchors"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn validate_binary_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[]);
    fs::write(temp.path().join("image.yml"), [0x89, b'P', b'N', b'G', 0xff, 0x00])?;
    yamldoctor(&temp)
        .args(["validate", "image.yml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("security/binary"));
    Ok(())
}

#[test]
fn validate_syntax_error_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("bad.yml", "foo: [1\n")]);
    yamldoctor(&temp)
        .args(["validate", "bad.yml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[parser/syntax]"));
    Ok(())
}

#[test]
fn validate_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("stack.yml", "Resources:\n  Q:\n    Type: AWS::SQS::Queue\n")]);
    let output = yamldoctor(&temp)
        .args(["validate", "stack.yml", "--format", "json"])
        .output()?;

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["file"], "stack.yml");
    assert_eq!(value["providerSummary"]["provider"], "template");
    assert_eq!(value["providerSummary"]["sources"]["templateSpec"], "embedded");
    Ok(())
}

#[test]
fn validate_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[
        ("yaml/a.yml", "a: 1\n"),
        ("yaml/nested/b.yaml", "steps:\n  - script: make\n"),
        ("yaml/notes.txt", "not yaml"),
    ]);
    yamldoctor(&temp)
        .args(["validate", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.yml"))
        .stdout(predicate::str::contains("b.yaml"))
        .stdout(predicate::str::contains("notes.txt").not())
        .stderr(predicate::str::contains("2 of 2 file(s) passed"));
    Ok(())
}

#[test]
fn validate_rejects_unknown_provider() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "a: 1\n")]);
    yamldoctor(&temp)
        .args(["validate", "ci.yml", "--provider", "helm"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown dialect"));
    Ok(())
}

#[test]
fn suggest_lists_rename() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "steps:\n  - srcipt: echo hi\n")]);
    yamldoctor(&temp)
        .args(["suggest", "ci.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] rename steps[0].srcipt"));
    Ok(())
}

#[test]
fn fix_select_prints_result() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "steps:\n  - srcipt: echo hi\n")]);
    yamldoctor(&temp)
        .args(["fix", "ci.yml", "--select", "0"])
        .assert()
        .success()
        .stdout("steps:\n  - script: echo hi\n");
    Ok(())
}

#[test]
fn fix_write_updates_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "steps:\n  - srcipt: echo hi\n")]);
    yamldoctor(&temp)
        .args(["fix", "ci.yml", "--all", "--write"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(temp.path().join("ci.yml"))?,
        "steps:\n  - script: echo hi\n"
    );
    Ok(())
}

#[test]
fn fix_without_selection_in_pipe_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("ci.yml", "steps:\n  - srcipt: echo hi\n")]);
    yamldoctor(&temp)
        .args(["fix", "ci.yml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--select"));
    Ok(())
}

#[test]
fn convert_yaml_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("app.yml", "name: app\nports: [80, 443]\n")]);
    let output = yamldoctor(&temp).args(["convert", "app.yml"]).output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["ports"][1], 443);
    Ok(())
}

#[test]
fn convert_json_to_yaml() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[("app.json", r#"{"name": "app"}"#)]);
    yamldoctor(&temp)
        .args(["convert", "app.json"])
        .assert()
        .success()
        .stdout("name: app\n");
    Ok(())
}

#[test]
fn schema_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[]);
    yamldoctor(&temp)
        .args(["schema", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("parse_timeout_ms"));
    Ok(())
}

#[test]
fn invalid_config_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(&[]);
    fs::write(temp.path().join(".yamldoctor.yml"), "parse_timeout_ms: [\n")?;
    fs::write(temp.path().join("a.yml"), "a: 1\n")?;
    yamldoctor(&temp)
        .args(["validate", "a.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config"));
    Ok(())
}
