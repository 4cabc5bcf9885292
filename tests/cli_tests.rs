//! CLI tests for the `sem` binary
//!
//! Exit codes and output shape only; the underlying behavior is covered by
//! the library-level integration tests.

mod common;

use assert_cmd::Command;
use common::TestRepo;
use predicates::prelude::*;

fn sem() -> Command {
    Command::cargo_bin("sem").expect("sem binary builds")
}

#[test]
fn test_diff_outside_a_repo_fails_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    sem()
        .current_dir(dir.path())
        .arg("diff")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a git repository"));
}

#[test]
fn test_diff_with_no_changes_succeeds() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function a() { return 1; }\n");
    repo.commit("initial");
    repo.add_file("a.ts", "function a() { return 1; }\n"); // byte-identical rewrite

    sem().current_dir(repo.path()).arg("diff").assert().success();
}

#[test]
fn test_diff_json_output_matches_schema() {
    let repo = TestRepo::with_git();
    repo.add_file("app.ts", "function greet() { return 'hi'; }\n");
    repo.commit("initial");
    repo.add_file("app.ts", "function greet() { return 'hello'; }\n");

    let output = sem()
        .current_dir(repo.path())
        .args(["diff", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["summary"]["modified"], 1);
    assert_eq!(parsed["summary"]["fileCount"], 1);
    assert_eq!(parsed["changes"][0]["changeType"], "modified");
    assert_eq!(parsed["changes"][0]["entityName"], "greet");
    assert_eq!(
        parsed["changes"][0]["entityId"],
        "app.ts::function::greet"
    );
}

#[test]
fn test_diff_terminal_output_names_entities() {
    let repo = TestRepo::with_git();
    repo.add_file("app.ts", "function greet() { return 'hi'; }\n");
    repo.commit("initial");
    repo.add_file("app.ts", "function greet() { return 'hello'; }\n");

    sem()
        .current_dir(repo.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("modified"));
}

#[test]
fn test_bare_invocation_defaults_to_diff() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function a() {}\n");
    repo.commit("initial");

    sem().current_dir(repo.path()).assert().success();
}

#[test]
fn test_snapshot_then_query_round_trip() {
    let repo = TestRepo::with_git();
    repo.add_file("lib.ts", "function f() { return 1; }\nfunction g() { return 2; }\n");
    repo.commit("initial");

    sem()
        .current_dir(repo.path())
        .arg("snapshot")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entities"));

    let output = sem()
        .current_dir(repo.path())
        .args([
            "query",
            "SELECT name FROM entities WHERE snapshot = 'current' ORDER BY name",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(rows[0]["name"], "f");
    assert_eq!(rows[1]["name"], "g");
}

#[test]
fn test_invalid_query_fails_with_status_one() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function a() {}\n");
    repo.commit("initial");
    sem().current_dir(repo.path()).arg("snapshot").assert().success();

    sem()
        .current_dir(repo.path())
        .args(["query", "SELECT FROM nothing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_blame_command() {
    let repo = TestRepo::with_git();
    repo.add_file("lib.ts", "function f() { return 1; }\n");
    repo.commit("first");

    sem()
        .current_dir(repo.path())
        .args(["blame", "lib.ts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("f"));
}

#[test]
fn test_blame_missing_file_fails() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function a() {}\n");
    repo.commit("initial");

    sem()
        .current_dir(repo.path())
        .args(["blame", "missing.ts"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_history_command_json() {
    let repo = TestRepo::with_git();
    repo.add_file("lib.ts", "function tracked() { return 1; }\n");
    repo.commit("add tracked");
    repo.add_file("lib.ts", "function tracked() { return 2; }\n");
    repo.commit("edit tracked");

    let output = sem()
        .current_dir(repo.path())
        .args(["--format", "json", "history", "tracked"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["entityId"], "lib.ts::function::tracked");
    let events = parsed["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["changeType"], "modified");
    assert_eq!(events[1]["changeType"], "added");
}
