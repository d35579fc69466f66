#![allow(deprecated)] // Command::cargo_bin is deprecated in favor of a same-package macro

use assert_cmd::Command;
use predicates::str::contains;

fn matcher_cmd() -> Command {
    let mut cmd = Command::cargo_bin("resume-matcher").unwrap();
    cmd.env_remove("MATCHER_BIND_ADDR")
        .env_remove("MATCHER_PORT")
        .env_remove("ENDEE_HOST")
        .env_remove("ENDEE_INDEX_NAME");
    cmd
}

#[test]
fn help_lists_flags() {
    matcher_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--bind-addr"))
        .stdout(contains("--port"))
        .stdout(contains("--endee-host"))
        .stdout(contains("--index-name"));
}

#[test]
fn version_flag_prints_version() {
    matcher_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn invalid_port_is_rejected() {
    matcher_cmd()
        .args(["--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(contains("--port"));
}
