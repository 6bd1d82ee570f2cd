use std::path::Path;
use std::process::{Command, Output};

fn grader(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ams-grader"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run ams-grader")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn list_prints_every_group() {
    let output = grader(&["list"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 6);
    assert!(text.starts_with("Question row_lists\t1 point(s)\t4 case(s)"));
}

#[test]
fn export_writes_records() {
    let dir = tempfile::tempdir().unwrap();
    let output = grader(&["export", "--out", path(dir.path())]);
    assert!(output.status.success());
    let bytes = std::fs::read(dir.path().join("06_p_est.json")).unwrap();
    let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(record["name"], "Question 06_p_est");
    assert_eq!(record["suites"][0]["cases"].as_array().unwrap().len(), 4);
}

#[test]
fn placeholder_environment_grades_to_zero_but_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join("start.json");
    let out = dir.path().join("report");
    assert!(grader(&["simulate", "--placeholder", "--out", path(&env)])
        .status
        .success());
    let output = grader(&["grade", "--env", path(&env), "--out", path(&out)]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Total: 0/6 point(s)"));
    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("grade_report.json")).unwrap()).unwrap();
    assert_eq!(report["points_earned"], 0.0);
    assert_eq!(report["groups"].as_array().unwrap().len(), 6);
}

#[test]
fn reference_environment_passes_deterministic_groups() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join("solution.json");
    let simulate = grader(&[
        "simulate",
        "--seed",
        "7",
        "--trials",
        "50",
        "--out",
        path(&env),
    ]);
    assert!(simulate.status.success());
    assert!(dir.path().join("solution.provenance.json").exists());

    let output = grader(&[
        "grade",
        "--env",
        path(&env),
        "--group",
        "Question row_lists",
        "--group",
        "Question people",
        "--group",
        "Question ams",
        "--group",
        "Question 04_fake_ams_counts",
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Total: 4/4 point(s)"));
}

#[test]
fn policy_file_and_exported_checks_are_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join("start.json");
    let checks = dir.path().join("checks");
    let policy = dir.path().join("policy.yaml");
    std::fs::write(&policy, "scoring: proportional\n").unwrap();
    assert!(grader(&["simulate", "--placeholder", "--out", path(&env)])
        .status
        .success());
    assert!(grader(&["export", "--out", path(&checks)]).status.success());

    let output = grader(&[
        "grade",
        "--env",
        path(&env),
        "--policy",
        path(&policy),
        "--check",
        path(&checks.join("06_p_est.json")),
    ]);
    assert!(output.status.success());
    // Only the "exists" case passes for a placeholder.
    assert!(stdout(&output).contains("Question 06_p_est: 0.25/1 point(s)"));
}

#[test]
fn unknown_group_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join("start.json");
    assert!(grader(&["simulate", "--placeholder", "--out", path(&env)])
        .status
        .success());
    let output = grader(&["grade", "--env", path(&env), "--group", "Question 99"]);
    assert!(!output.status.success());
}
