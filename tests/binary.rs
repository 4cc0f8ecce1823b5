//! Tests running the bundled demo binary

use assert_cmd::Command;
use predicates::prelude::*;

fn subcli() -> Command {
    Command::cargo_bin("subcli").unwrap()
}

#[test]
fn test_version() {
    subcli()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_ignores_following_command() {
    subcli()
        .args(["--version", "nope"])
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_greet_uses_context_kwargs() {
    subcli()
        .args(["greet", "--name", "Ann"])
        .assert()
        .success()
        .stdout("Hello, Ann!\n");
}

#[test]
fn test_greet_shout() {
    subcli()
        .args(["greet", "--shout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HELLO, WORLD!"));
}

#[test]
fn test_help_command() {
    subcli()
        .args(["help", "greet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Greet someone"))
        .stdout(predicate::str::contains("--shout"));
}

#[test]
fn test_top_level_help_lists_commands() {
    subcli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("echo"))
        .stdout(predicate::str::contains("exit-with"));
}

#[test]
fn test_echo() {
    subcli()
        .args(["echo", "a", "b", "c"])
        .assert()
        .success()
        .stdout("a b c\n");
}

#[test]
fn test_handler_exit_status() {
    subcli().args(["exit-with", "3"]).assert().code(3);
}

#[test]
fn test_unknown_command() {
    subcli()
        .arg("nope")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_no_command() {
    subcli()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_bad_option() {
    subcli()
        .args(["echo", "--nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--nope"));
}
