use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn init_scaffolds_a_manifest_and_a_starter_class() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("hello");

    let mut cmd = Command::cargo_bin("serpentc").unwrap();
    cmd.current_dir(dir.path())
        .args(["init", "hello"])
        .assert()
        .success();

    assert!(project.join("serpent.toml").exists());
    assert!(project.join("src").join("app.e").exists());
    let manifest = fs::read_to_string(project.join("serpent.toml")).unwrap();
    assert!(manifest.contains("main_class"));
}

#[test]
fn init_refuses_to_overwrite_an_existing_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("hello")).unwrap();

    let mut cmd = Command::cargo_bin("serpentc").unwrap();
    let assert = cmd
        .current_dir(dir.path())
        .args(["init", "hello"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("already exists"), "stderr: {stderr}");
}

#[test]
fn build_reports_a_clear_error_when_the_parser_binary_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("app.e"), "class APPLICATION end\n").unwrap();

    let mut cmd = Command::cargo_bin("serpentc").unwrap();
    let assert = cmd
        .current_dir(dir.path())
        .args(["build", "src"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("eiffelp"), "stderr: {stderr}");
}

#[test]
fn build_reports_missing_source_directory_before_invoking_the_parser() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("serpentc").unwrap();
    let assert = cmd
        .current_dir(dir.path())
        .args(["build", "does-not-exist"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(!stderr.trim().is_empty());
}
