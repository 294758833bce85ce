use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("card-enroller").unwrap();
    cmd.env("RUST_LOG", "info").env_remove("UFO_CLIENT_SECRET");
    cmd
}

fn workspace(csv: &str) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(dir.path().join("users.csv"), csv).expect("write input");
    dir
}

#[test]
fn help_exits_cleanly() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--ufo-url"));
}

#[test]
fn missing_domain_is_fatal() {
    let dir = workspace("login,tid\n");
    cmd()
        .current_dir(dir.path())
        .args(["--path", "users.csv", "--ufo-url", "https://acme.example.com", "--interactive"])
        .assert()
        .code(1)
        .stderr(contains("--domain"));
}

#[test]
fn missing_input_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args([
            "--path",
            "absent.csv",
            "--ufo-url",
            "https://acme.example.com",
            "--domain",
            "example.com",
            "--interactive",
        ])
        .assert()
        .code(1)
        .stderr(contains("could not load absent.csv"));
}

#[test]
fn reversed_columns_fail_in_strict_mode() {
    let dir = workspace("tid,login\n1a2b3c4d,abc1\n");
    cmd()
        .current_dir(dir.path())
        .args([
            "--path",
            "users.csv",
            "--ufo-url",
            "https://acme.example.com",
            "--domain",
            "example.com",
            "--interactive",
            "--strict-columns",
        ])
        .assert()
        .code(1)
        .stderr(contains("expected columns [login, tid] but found [tid, login]"));
}

#[test]
fn bad_tenant_url_fails_before_any_row() {
    let dir = workspace("login,tid\nabc1,1a2b3c4d\n");
    cmd()
        .current_dir(dir.path())
        .args([
            "--path",
            "users.csv",
            "--ufo-url",
            "not a url",
            "--domain",
            "example.com",
            "--client-id",
            "enroller",
            "--client-secret",
            "hunter2",
        ])
        .assert()
        .code(1)
        .stderr(contains("authentication failed"))
        .stderr(contains("hunter2").not());

    assert!(!dir.path().join("results.log").exists());
}

#[test]
fn cancelled_interactive_login_is_fatal() {
    let dir = workspace("login,tid\nabc1,1a2b3c4d\n");
    cmd()
        .current_dir(dir.path())
        .args([
            "--path",
            "users.csv",
            "--ufo-url",
            "https://acme.example.com",
            "--domain",
            "example.com",
            "--interactive",
        ])
        .write_stdin("\n")
        .assert()
        .code(1)
        .stderr(contains("login was cancelled"));
}

#[test]
fn row_failures_still_complete_the_batch() {
    // nothing listens on port 9, so every submission fails at transport level
    let dir = workspace("login,tid\nabc1,1a2b3c4d\nab1,1a2b3c4d\nxyz2,DEADBEEF\n");
    cmd()
        .current_dir(dir.path())
        .args([
            "--path",
            "users.csv",
            "--ufo-url",
            "http://127.0.0.1:9",
            "--domain",
            "example.com",
            "--interactive",
        ])
        .write_stdin("tok-42\n")
        .assert()
        .success()
        .stdout(contains("Total: 3, Successes: 0, Failures: 3"))
        .stderr(contains("[1/3] assigning CardNumber to abc1@example.com"))
        .stderr(contains("[2/3]").not())
        .stderr(contains("[3/3] assigning CardNumber to xyz2@example.com"));

    let log = fs::read_to_string(dir.path().join("results.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("abc1,1a2b3c4d,") && lines[1].contains("RemoteError: "));
    assert_eq!(lines[2], "ab1,1a2b3c4d,LoginFormatError");
    assert!(lines[3].starts_with("xyz2,DEADBEEF,") && lines[3].contains("RemoteError: "));
}
