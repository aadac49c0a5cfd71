// ABOUTME: Integration tests for the ecr-cleaner CLI.
// ABOUTME: Validates --help output, argument checks and config file errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cleaner_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ecr-cleaner"));
    cmd.env_remove("LOG_LEVEL")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_shows_flags() {
    cleaner_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config-file"))
        .stdout(predicate::str::contains("--repositories"))
        .stdout(predicate::str::contains("--region"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--execute"));
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    cleaner_cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn repositories_without_region_fails() {
    cleaner_cmd()
        .args(["--repositories", "app:latest=1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn zero_batch_size_is_rejected() {
    cleaner_cmd()
        .args(["--repositories", "app:latest=1", "--region", "us-east-1"])
        .args(["--batch-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--batch-size"));
}

#[test]
fn dry_run_conflicts_with_execute() {
    cleaner_cmd()
        .args(["--repositories", "app:latest=1", "--region", "us-east-1"])
        .args(["--dry-run", "--execute"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn malformed_entries_are_reported_and_fail_the_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("cleaner.yml");
    fs::write(
        &config_path,
        "region: us-east-1\nrepositories:\n  - no-policy-separator\n  - app:latest=many\n  - name: other\n    policy:\n      latest: -1\n",
    )
    .unwrap();

    cleaner_cmd()
        .arg("--config-file")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid repository configuration"))
        .stderr(predicate::str::contains("no-policy-separator"))
        .stderr(predicate::str::contains("invalid keep count '-1' for latest"))
        .stderr(predicate::str::contains(
            "3 repository configuration(s) could not be parsed",
        ));
}

#[test]
fn config_without_region_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("cleaner.yml");
    fs::write(&config_path, "repositories:\n  - app:latest=1\n").unwrap();

    cleaner_cmd()
        .arg("--config-file")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no region configured"));
}

#[test]
fn unknown_config_field_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("cleaner.yml");
    fs::write(&config_path, "region: us-east-1\nrepos: []\n").unwrap();

    cleaner_cmd()
        .arg("--config-file")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML parse error"));
}

#[test]
fn missing_config_file_fails() {
    cleaner_cmd()
        .args(["--config-file", "/nonexistent/cleaner.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("I/O error"));
}
