// Binary-level tests: exit codes and the printed report.
#![cfg(unix)]

mod common;

use std::fs;

use assert_cmd::Command;
use common::FakeToolchain;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn harness() -> Command {
    let mut cmd = Command::cargo_bin("decaf-harness").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_setup(tools: &FakeToolchain, catalog: &str) -> (String, String) {
    let config = tools.path().join("harness.yaml");
    fs::write(&config, tools.config_yaml()).unwrap();
    let catalog_path = tools.path().join("catalog.yaml");
    fs::write(&catalog_path, catalog).unwrap();
    (
        config.display().to_string(),
        catalog_path.display().to_string(),
    )
}

#[test]
fn passing_suite_exits_zero() {
    let tools = FakeToolchain::new();
    tools.source("test_files/t1", &["6"]);
    let (config, catalog) = write_setup(
        &tools,
        "- { name: t1, stem: test_files/t1, category: functional, expected: [\"6\"] }\n",
    );

    harness()
        .args(["--no-color", "--config", &config, "run", "--catalog", &catalog])
        .assert()
        .success()
        .stdout(contains("PASS: t1").and(contains("total 1, passed 1")));
}

#[test]
fn failing_suite_prints_got_and_expected() {
    let tools = FakeToolchain::new();
    tools.source("test_files/t1", &["3", "2.0"]);
    let (config, catalog) = write_setup(
        &tools,
        "- { name: t1, stem: test_files/t1, category: functional, expected: [\"3.0\", \"2.0\"] }\n",
    );

    harness()
        .args(["--no-color", "--config", &config, "run", "--catalog", &catalog])
        .assert()
        .code(1)
        .stdout(
            contains("FAIL: t1")
                .and(contains("got:\t\t3,2.0"))
                .and(contains("expected:\t3.0,2.0")),
        );
}

#[test]
fn missing_source_is_reported_as_error() {
    let tools = FakeToolchain::new();
    let (config, catalog) = write_setup(
        &tools,
        "- { name: t1, stem: test_files/t1, category: functional, expected: [\"6\"] }\n",
    );

    harness()
        .args(["--no-color", "--config", &config, "run", "--catalog", &catalog])
        .assert()
        .code(1)
        .stdout(contains("ERROR: t1").and(contains("compile stage failed")));
}

#[test]
fn json_report_is_machine_readable() {
    let tools = FakeToolchain::new();
    tools.source("test_files/t1", &["6"]);
    let (config, catalog) = write_setup(
        &tools,
        "- { name: t1, stem: test_files/t1, category: functional, expected: [\"6\"] }\n",
    );

    let output = harness()
        .args([
            "--config", &config, "run", "--catalog", &catalog, "--format", "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["verdicts"][0]["fixture_name"], "t1");
    assert_eq!(value["summary"]["passed"], 1);
}

#[test]
fn bad_catalog_exits_with_usage_code() {
    let tools = FakeToolchain::new();
    let (config, catalog) = write_setup(
        &tools,
        "- { name: t1, stem: a, category: functional, expected: [] }\n- { name: t3, stem: b, category: functional, expected: [] }\n",
    );

    harness()
        .args(["--no-color", "--config", &config, "run", "--catalog", &catalog])
        .assert()
        .code(2)
        .stderr(contains("numbering"));
}

#[test]
fn list_shows_builtin_suite() {
    harness()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("basic").and(contains("test_files/t9")).and(contains("w3")));
}

#[test]
fn normalize_strips_banner() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.txt");
    fs::write(&capture, "banner one\nbanner two\n  6 \n3.0\n").unwrap();

    harness()
        .arg("normalize")
        .arg(&capture)
        .assert()
        .success()
        .stdout("6\n3.0\n");
}
