//! Exercises the six end-to-end scenarios from `SPEC_FULL.md` §8 against the
//! real `proctest-demos` binary, spawned twice: once as `server`, which in
//! turn spawns this same binary as `client` once per test.

use std::path::PathBuf;
use std::process::Command;

fn demos_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_proctest-demos"))
}

fn run_server(timeout_ms: u32, contexts: &[(&str, &str)]) -> (String, String, bool) {
    let mut cmd = Command::new(demos_bin());
    cmd.arg("server").arg(demos_bin()).arg("--timeout-ms").arg(timeout_ms.to_string());
    for (name, hex_bytes) in contexts {
        cmd.arg("--context").arg(format!("{name}={hex_bytes}"));
    }
    let output = cmd.output().expect("failed to run proctest-demos server");
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.success(),
    )
}

#[test]
fn passing_tests_report_success() {
    let (stdout, _stderr, ok) = run_server(5_000, &[("Int", "34120000")]);
    assert!(ok);
    assert!(stdout.contains("demos::a_passes ...\tSuccess"));
    assert!(stdout.contains("demos::b_passes ...\tSuccess"));
}

#[test]
fn assertion_failure_is_reported_with_expected_and_actual() {
    let (_stdout, stderr, ok) = run_server(5_000, &[("Int", "34120000")]);
    assert!(ok);
    assert!(stderr.contains("demos::assertion_fails"));
    assert!(stderr.contains("Expected: 1 = 1"));
    assert!(stderr.contains("Actual: 2 = 2"));
}

#[test]
fn panic_is_reported_verbatim() {
    let (_stdout, stderr, ok) = run_server(5_000, &[("Int", "34120000")]);
    assert!(ok);
    // The reported message must be exactly "boom", with no stack-frame name
    // prepended (e.g. "demos::panics: boom") — assert the literal line, not
    // two independent substrings that a prefixed message would also satisfy.
    assert!(stderr.contains("\"demos::panics\" failed with errors:\n  boom\n"));
}

#[test]
fn infinite_loop_is_classified_as_timeout() {
    let (_stdout, stderr, ok) = run_server(500, &[("Int", "34120000")]);
    assert!(ok);
    assert!(stderr.contains("demos::loops_forever"));
    assert!(stderr.contains("Message never received"));
}

#[test]
fn matching_context_is_delivered_and_test_passes() {
    let (stdout, _stderr, ok) = run_server(5_000, &[("Int", "34120000")]);
    assert!(ok);
    assert!(stdout.contains("demos::reads_int_context (Int) ...\tSuccess"));
}

#[test]
fn missing_context_fails_without_spawning_a_child() {
    let (_stdout, stderr, ok) = run_server(5_000, &[]);
    assert!(ok);
    assert!(stderr.contains("Invalid context type: Int"));
}

#[test]
fn full_run_reports_overall_failure_count() {
    let (_stdout, stderr, ok) = run_server(500, &[("Int", "34120000")]);
    assert!(ok);
    assert!(stderr.contains("tests failed"));
}
