//! CLI binary smoke tests using assert_cmd.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("whisker").unwrap()
}

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("whisker"));
}

#[test]
fn train_with_missing_config_fails() {
    cmd()
        .args(["train", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn train_with_bad_learning_rate_is_a_usage_error() {
    cmd()
        .args(["train", "config.json", "--learning-rate", "fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn predict_requires_inputs() {
    cmd()
        .args(["predict", "-m", "model.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<inputs>"));
}

#[test]
fn train_evaluate_predict_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    common::write_dataset(dir.path());
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{ "image": { "width": 4, "height": 4 }, "model": { "learning_rate": 0.5 } }"#,
    )
    .unwrap();
    let model = dir.path().join("model.bin");

    cmd()
        .arg("train")
        .arg(&config)
        .arg("-d")
        .arg(dir.path())
        .arg("-o")
        .arg(&model)
        .args(["--iterations", "200", "--no-report"])
        .assert()
        .success();
    assert!(model.is_file());
    assert!(!dir.path().join("model_report.html").exists());

    cmd()
        .arg("evaluate")
        .arg(&config)
        .arg("-d")
        .arg(dir.path())
        .arg("-m")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"test_set_size\": 6"))
        .stdout(predicate::str::contains("accuracy"));

    cmd()
        .arg("predict")
        .arg("-m")
        .arg(&model)
        .arg(dir.path().join("test").join("negative"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("file,prediction,probability"));
}
