// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-level integration tests for the `clihost` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn clihost() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("clihost").expect("binary `clihost` should be built")
}

#[test]
fn help_exits_zero_and_lists_demo_commands() {
    clihost()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("profile-demo"))
        .stdout(predicate::str::contains("chain-demo"));
}

#[test]
fn version_shows_version_string() {
    clihost()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn greet_with_name_succeeds_and_prints_greeting() {
    clihost()
        .args(["greet", "--name", "Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello Ada"));
}

#[test]
fn greet_without_name_fails_with_usage_hint() {
    clihost()
        .arg("greet")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--help"));
}

#[test]
fn greet_json_emits_single_json_document() {
    let output = clihost()
        .args(["--json", "greet", "--name", "Ada"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(value["success"], true);
    assert_eq!(value["exitCode"], 0);
    assert_eq!(value["data"]["greeted"], "Ada");
}

#[test]
fn profile_demo_resolves_dependency_chain() {
    clihost()
        .arg("profile-demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("main profile: m1"))
        .stdout(predicate::str::contains("dep profile: d1"));
}

#[test]
fn chain_demo_runs_both_steps_in_order() {
    clihost()
        .arg("chain-demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("step one"))
        .stdout(predicate::str::contains("step two auth=T"));
}
