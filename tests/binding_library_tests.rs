//! Binding library management through the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn config_in(dir: &Path) -> PathBuf {
    dir.join("config.json")
}

fn bomcheck(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bomcheck").unwrap();
    cmd.arg("-c").arg(config);
    cmd
}

#[test]
fn template_appends_a_project_and_show_prints_it() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());

    bomcheck(&config)
        .arg("binding")
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Appended template project"));

    assert!(tmp.path().join("绑定料号.js").is_file());

    bomcheck(&config)
        .arg("binding")
        .arg("show")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("示例项目 (UC3000-000)")
                .and(predicate::str::contains("[配套螺丝] x2"))
                .and(predicate::str::contains("[NOTANY UC3100-001]")),
        );

    bomcheck(&config)
        .arg("binding")
        .arg("show")
        .arg("UC9999-000")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No project bound to UC9999-000"));
}

#[test]
fn export_and_import_round_trip_through_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());

    bomcheck(&config)
        .arg("binding")
        .arg("template")
        .assert()
        .success();

    let review = tmp.path().join("review.csv");
    bomcheck(&config)
        .arg("binding")
        .arg("export")
        .arg(&review)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Exported 1 projects"));

    let exported = std::fs::read_to_string(&review).unwrap();
    assert!(exported.contains("项目描述"));
    assert!(exported.contains("UC3100-002"));

    bomcheck(&config)
        .arg("binding")
        .arg("import")
        .arg(&review)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Imported 1 projects"));

    // The re-imported library still shows the conditional choice.
    bomcheck(&config)
        .arg("binding")
        .arg("show")
        .arg("UC3000-000")
        .assert()
        .success()
        .stdout(predicate::str::contains("[NOTANY UC3100-001]"));
}

#[test]
fn import_of_a_missing_file_fails_naming_it() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());

    bomcheck(&config)
        .arg("binding")
        .arg("import")
        .arg(tmp.path().join("no-such-review.csv"))
        .assert()
        .failure()
        .code(1)
        .stderr(
            predicate::str::contains("input file not found")
                .and(predicate::str::contains("no-such-review.csv")),
        );
}

#[test]
fn remove_reports_whether_a_project_was_bound() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());

    bomcheck(&config)
        .arg("binding")
        .arg("template")
        .assert()
        .success();

    bomcheck(&config)
        .arg("binding")
        .arg("remove")
        .arg("UC3000-000")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Removed project"));

    bomcheck(&config)
        .arg("binding")
        .arg("remove")
        .arg("UC3000-000")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No project bound to UC3000-000"));

    bomcheck(&config)
        .arg("binding")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Binding library is empty"));
}

#[test]
fn legacy_bare_object_library_files_still_load() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    std::fs::write(
        tmp.path().join("绑定料号.js"),
        r#"{"projectDesc": "旧格式项目", "indexPartNo": "UC3000-777", "indexPartDesc": ""}"#,
    )
    .unwrap();

    bomcheck(&config)
        .arg("binding")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("旧格式项目 (UC3000-777)"));
}
