use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_offercheck_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("offercheck")
}

#[test]
fn test_run_command_help() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("run").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Run the search-and-offer flow in Chrome"))
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--poll-timeout-ms"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("OFFERCHECK_BASE_URL"));
}

#[test]
fn test_run_without_chrome_fails() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("run")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .env_remove("OFFERCHECK_BASE_URL");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_run_rejects_interval_longer_than_timeout() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("run")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .arg("--poll-timeout-ms")
        .arg("50")
        .arg("--poll-interval-ms")
        .arg("100");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must not be shorter than the interval"));
}

#[test]
fn test_run_rejects_zero_interval() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("run")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .arg("--poll-interval-ms")
        .arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("poll interval must be greater than zero"));
}

#[test]
fn test_run_rejects_empty_base_url() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("run")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .arg("--base-url")
        .arg(" ");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("base URL is empty"));
}

#[test]
fn test_run_base_url_from_environment_is_validated() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("run")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .env("OFFERCHECK_BASE_URL", "http://[::1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid base URL"));
}
