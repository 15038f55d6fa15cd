//! End-to-end pipeline runs against the compiled binary.
//!
//! Each test builds a throwaway project directory with its own Cargo.toml
//! and drives `bomcheck dist` at it. The build step is a shell one-liner so
//! the tests stay fast and hermetic.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

/// Writes a manifest whose build step produces `demo-bin` in the project
/// root. `extra` lands inside `[package.metadata.dist]`.
fn write_manifest(dir: &Path, extra: &str) -> PathBuf {
    let body = format!(
        r#"[package]
name = "demo"
version = "0.1.0"
description = "demo app"

[package.metadata.dist]
binary = "demo"
binary_path = "demo-bin"
build_command = ["sh", "-c", "printf demo > demo-bin"]
{extra}
"#
    );
    let path = dir.join("Cargo.toml");
    std::fs::write(&path, body).unwrap();
    path
}

fn bomcheck() -> Command {
    Command::cargo_bin("bomcheck").unwrap()
}

#[test]
fn directory_mode_stages_binary_and_resources_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("data")).unwrap();
    std::fs::write(tmp.path().join("data/config.json"), "{}").unwrap();
    std::fs::write(tmp.path().join("data/settings.json"), "{}").unwrap();

    let manifest = write_manifest(
        tmp.path(),
        r#"
[[package.metadata.dist.resources]]
source = "data/config.json"

[[package.metadata.dist.resources]]
source = "data/settings.json"
dest = "conf"
"#,
    );

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"));

    let stage = tmp.path().join("target/dist/demo");
    assert!(stage.join("demo").is_file());
    assert!(stage.join("config.json").is_file());
    assert!(stage.join("conf/settings.json").is_file());
    assert!(tmp.path().join("target/dist/dist-manifest.json").is_file());
}

#[test]
fn missing_declared_resource_fails_naming_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        tmp.path(),
        r#"
[[package.metadata.dist.resources]]
source = "data/absent.txt"
"#,
    );

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure()
        .code(1)
        .stderr(
            predicate::str::contains("stage step failed")
                .and(predicate::str::contains("absent.txt")),
        );

    // The stage directory is never created for a run that fails validation.
    assert!(!tmp.path().join("target/dist/demo").exists());
}

#[test]
fn missing_sideload_entry_fails_naming_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(tmp.path(), "sideload = [\"helper-bin\"]\n");

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("helper-bin"));
}

#[test]
fn bootstrap_leaves_an_existing_work_directory_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(tmp.path(), "");

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success();

    let marker = tmp.path().join("target/dist-work/marker.txt");
    std::fs::write(&marker, "keep me").unwrap();

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "keep me");
}

#[test]
fn failing_build_prevents_the_stage_step() {
    let tmp = tempfile::tempdir().unwrap();
    let body = r#"[package]
name = "demo"
version = "0.1.0"

[package.metadata.dist]
binary = "demo"
binary_path = "demo-bin"
build_command = ["sh", "-c", "exit 7"]
"#;
    let manifest = tmp.path().join("Cargo.toml");
    std::fs::write(&manifest, body).unwrap();

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("build step failed"));

    assert!(!tmp.path().join("target/dist/demo").exists());
    assert!(!tmp.path().join("demo-bin").exists());
}

#[test]
fn failing_dependency_resolution_prevents_the_build() {
    let tmp = tempfile::tempdir().unwrap();
    let body = r#"[package]
name = "demo"
version = "0.1.0"

[package.metadata.dist]
binary = "demo"
binary_path = "demo-bin"
fetch_command = ["sh", "-c", "exit 3"]
build_command = ["sh", "-c", "printf demo > demo-bin"]
"#;
    let manifest = tmp.path().join("Cargo.toml");
    std::fs::write(&manifest, body).unwrap();

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("bootstrap step failed"));

    // The build command never ran.
    assert!(!tmp.path().join("demo-bin").exists());
}

#[test]
fn skip_flags_gate_bootstrap_and_build() {
    let tmp = tempfile::tempdir().unwrap();
    // This build command would fail if it ever ran.
    let body = r#"[package]
name = "demo"
version = "0.1.0"

[package.metadata.dist]
binary = "demo"
binary_path = "demo-bin"
build_command = ["sh", "-c", "exit 1"]
"#;
    let manifest = tmp.path().join("Cargo.toml");
    std::fs::write(&manifest, body).unwrap();
    std::fs::write(tmp.path().join("demo-bin"), "prebuilt").unwrap();

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--no-bootstrap")
        .arg("--skip-build")
        .assert()
        .success();

    assert!(tmp.path().join("target/dist/demo/demo").is_file());
}

#[test]
fn archive_mode_emits_zip_and_run_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("data")).unwrap();
    std::fs::write(tmp.path().join("data/config.json"), "{}").unwrap();

    let manifest = write_manifest(
        tmp.path(),
        r#"mode = "archive"

[[package.metadata.dist.resources]]
source = "data/config.json"
"#,
    );

    bomcheck()
        .arg("dist")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo-0.1.0.zip"));

    let artifact = tmp.path().join("target/dist/demo-0.1.0.zip");
    assert!(artifact.is_file());

    let run_manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(tmp.path().join("target/dist/dist-manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(run_manifest["product"], "demo");
    assert_eq!(run_manifest["version"], "0.1.0");
    assert_eq!(run_manifest["description"], "demo app");
    assert_eq!(run_manifest["console"], true);
    assert_eq!(run_manifest["artifact"]["kind"], "archive");
    assert_eq!(run_manifest["artifact"]["path"], "demo-0.1.0.zip");
    assert_eq!(
        run_manifest["artifact"]["sha256"].as_str().unwrap().len(),
        64
    );
}
