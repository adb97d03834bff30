use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_offercheck_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("offercheck")
}

#[test]
fn test_completion_command_help() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("INSTALLATION"))
        .stdout(predicate::str::contains("~/.bashrc"));
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_offercheck()"))
        .stdout(predicate::str::contains("complete -F _offercheck"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef offercheck"));
}

#[test]
fn test_completion_rejects_unknown_shell() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("completion").arg("--shell").arg("tcsh");

    cmd.assert().failure();
}
