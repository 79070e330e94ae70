//! Integration tests for the quant CLI
//!
//! These tests run the binary against temporary projects

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("quant").unwrap();
    cmd.arg("--no-color").env_remove("RUST_LOG");
    cmd
}

const UTILITIES: &str = r#"
btn {
  color: white;
  background-color: #2563eb;
  &:hover { background-color: #1d4ed8; }
}

card { padding: 1rem; }

@media (min-width: 768px) {
  md:flex { display: flex; }
}
"#;

/// Project with a stylesheet, one page and a config file
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("styles")).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("styles/utilities.qs"), UTILITIES).unwrap();
    fs::write(
        root.join("src/index.html"),
        r#"<main><button class="btn btn:hover md:flex">Go</button></main>"#,
    )
    .unwrap();
    fs::write(root.join(".quantrc.json"), r#"{ "output": "public/app.css" }"#).unwrap();

    temp_dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("keeping only the rules"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_build_writes_used_rules_only() {
    let project = create_test_project();

    cli()
        .current_dir(project.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 3 rules"));

    let css = fs::read_to_string(project.path().join("public/app.css")).unwrap();
    assert_eq!(
        css,
        ".btn{color:white;background-color:#2563eb;}\n\
         .btn:hover{background-color:#1d4ed8;}\n\
         @media (min-width: 768px){.flex{display:flex;}}"
    );
    assert!(!css.contains(".card"));
}

#[test]
fn test_second_build_is_cached() {
    let project = create_test_project();

    cli().current_dir(project.path()).arg("build").assert().success();
    assert!(project.path().join(".quant-jitcache.json").exists());

    cli()
        .current_dir(project.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("(cached)"));

    cli()
        .current_dir(project.path())
        .args(["build", "--no-cache"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(cached)").not());
}

#[test]
fn test_build_minify_and_output_override() {
    let project = create_test_project();

    cli()
        .current_dir(project.path())
        .args(["build", "--minify", "--output", "out/min.css"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minified"));

    let css = fs::read_to_string(project.path().join("out/min.css")).unwrap();
    assert!(!css.contains('\n'));
    assert!(css.starts_with(".btn{"));
}

#[test]
fn test_build_strict_drops_prefix_mismatches() {
    let project = create_test_project();
    fs::write(
        project.path().join("src/index.html"),
        r#"<div class="hover:md:flex"></div>"#,
    )
    .unwrap();

    cli()
        .current_dir(project.path())
        .args(["build", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 0 rules"));
}

#[test]
fn test_build_missing_source_fails() {
    let project = create_test_project();
    fs::remove_file(project.path().join("styles/utilities.qs")).unwrap();

    cli()
        .current_dir(project.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("utilities.qs"));
}

#[test]
fn test_check_clean_project() {
    let project = create_test_project();

    cli()
        .current_dir(project.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues"));
}

#[test]
fn test_check_reports_errors_and_fails() {
    let project = create_test_project();
    fs::write(
        project.path().join("styles/utilities.qs"),
        "btn { color: red; }\n{ margin: 0; }\n",
    )
    .unwrap();

    cli()
        .current_dir(project.path())
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[Q000]"))
        .stdout(predicate::str::contains("utilities.qs:2:1"));
}

#[test]
fn test_check_json_output() {
    let project = create_test_project();
    fs::write(
        project.path().join("src/extra.html"),
        r#"<p class="ghost"></p>"#,
    )
    .unwrap();

    let output = cli()
        .current_dir(project.path())
        .args(["check", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["undeclaredClasses"], serde_json::json!(["ghost"]));
    assert_eq!(report["summary"]["errors"], 0);
}

#[test]
fn test_check_error_on_warnings() {
    let project = create_test_project();
    fs::write(
        project.path().join("styles/utilities.qs"),
        "btn { colr: red; }\n",
    )
    .unwrap();

    cli()
        .current_dir(project.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("warning[Q102]"));

    cli()
        .current_dir(project.path())
        .args(["check", "--error-on-warnings"])
        .assert()
        .code(1);
}

#[test]
fn test_config_init_and_show() {
    let temp_dir = TempDir::new().unwrap();

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--format", "toml"])
        .assert()
        .success();
    assert!(temp_dir.path().join(".quantrc.toml").exists());

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--format", "toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matchMode\": \"flex\""))
        .stderr(predicate::str::contains(".quantrc.toml"));
}

#[test]
fn test_config_schema() {
    let temp_dir = TempDir::new().unwrap();
    let schema_path = temp_dir.path().join("schema.json");

    cli()
        .args(["config", "schema", "--output"])
        .arg(&schema_path)
        .assert()
        .success();

    let schema: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&schema_path).unwrap()).unwrap();
    assert!(schema["properties"]["matchMode"].is_object());
}
