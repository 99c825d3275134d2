// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end supervision tests against real OS processes.
//!
//! Validates natural exit, stream capture and ordering, env merging,
//! launch failure, cancellation-triggered kill, and no-op cancellation
//! after exit. Uses `sh` as the supervised process, so the file is
//! unix-only.
#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hopbench_supervise::{CancelToken, LineHooks, ProcessSpec, SuperviseError, supervise};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sh(script: &str) -> ProcessSpec {
    let mut spec = ProcessSpec::new("sh");
    spec.args = vec!["-c".to_string(), script.to_string()];
    spec
}

async fn run(spec: ProcessSpec) -> hopbench_supervise::ProcessResult {
    tokio::time::timeout(
        Duration::from_secs(10),
        supervise(spec, LineHooks::default(), CancelToken::new()),
    )
    .await
    .expect("supervise should not hang")
    .expect("supervise should succeed")
}

// ---------------------------------------------------------------------------
// 1. Natural exit with captured output
// ---------------------------------------------------------------------------

#[tokio::test]
async fn natural_exit_captures_both_lines() {
    let result = run(sh("echo A; echo B")).await;
    assert_eq!(result.exit_code, Some(0));
    assert!(result.success());
    assert_eq!(result.stdout.lines(), ["A", "B"]);
    assert!(result.stderr.is_empty());
    assert!(result.stdout.is_sealed());
    assert!(result.stderr.is_sealed());
}

#[tokio::test]
async fn stdout_and_stderr_are_captured_independently() {
    let result = run(sh("echo out; echo err 1>&2")).await;
    assert_eq!(result.stdout.lines(), ["out"]);
    assert_eq!(result.stderr.lines(), ["err"]);
}

#[tokio::test]
async fn exit_code_is_reported_verbatim() {
    // Non-zero exit is not an error from the core; the code comes back as-is.
    let result = run(sh("echo failing 1>&2; exit 7")).await;
    assert_eq!(result.exit_code, Some(7));
    assert!(!result.success());
    assert_eq!(result.stderr.lines(), ["failing"]);
}

// ---------------------------------------------------------------------------
// 2. Line ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn line_order_is_preserved_within_a_stream() {
    let result = run(sh(
        "i=1; while [ \"$i\" -le 50 ]; do echo \"line $i\"; i=$((i+1)); done",
    ))
    .await;
    let expected: Vec<String> = (1..=50).map(|i| format!("line {i}")).collect();
    assert_eq!(result.stdout.lines(), expected);
}

// ---------------------------------------------------------------------------
// 3. Environment merging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn env_overrides_reach_the_child() {
    let mut spec = sh("echo \"$HOPBENCH_TEST_VALUE\"");
    spec.env
        .insert("HOPBENCH_TEST_VALUE".to_string(), "bar".to_string());
    let result = run(spec).await;
    assert_eq!(result.stdout.lines(), ["bar"]);
}

#[tokio::test]
async fn inherited_environment_survives_the_merge() {
    // PATH comes from the parent; overrides are additive, not a reset.
    let mut spec = sh("echo \"${PATH:+inherited}\"");
    spec.env
        .insert("HOPBENCH_UNRELATED".to_string(), "x".to_string());
    let result = run(spec).await;
    assert_eq!(result.stdout.lines(), ["inherited"]);
}

// ---------------------------------------------------------------------------
// 4. Launch failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nonexistent_executable_fails_with_launch_error() {
    let spec = ProcessSpec::new("hopbench-no-such-binary-xyz");
    let err = supervise(spec, LineHooks::default(), CancelToken::new())
        .await
        .expect_err("spawn should fail");
    assert!(
        matches!(err, SuperviseError::Launch { ref command, .. } if command == "hopbench-no-such-binary-xyz"),
        "expected Launch error, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// 5. Per-line hooks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hooks_observe_lines_in_delivery_order() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&seen);
    let hooks = LineHooks {
        on_stdout: Some(Box::new(move |line| {
            sink.lock().unwrap().push(line.to_string());
        })),
        on_stderr: None,
    };

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        supervise(sh("echo one; echo two; echo three"), hooks, CancelToken::new()),
    )
    .await
    .unwrap()
    .unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, ["one", "two", "three"]);
    assert_eq!(result.stdout.lines(), seen);
}

// ---------------------------------------------------------------------------
// 6. Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_kills_a_running_process_and_keeps_captured_lines() {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let hooks = LineHooks {
        on_stdout: Some(Box::new(move |line| {
            let _ = tx.send(line.to_string());
        })),
        on_stderr: None,
    };

    let cancel = CancelToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { supervise(sh("echo started; sleep 10"), hooks, cancel).await })
    };

    // Wait for the process to prove it is running, then cancel.
    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("first line should arrive")
        .expect("hook channel open");
    assert_eq!(first, "started");

    let cancelled_at = Instant::now();
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("cancellation must not hang")
        .unwrap()
        .unwrap();

    assert!(
        cancelled_at.elapsed() < Duration::from_secs(5),
        "kill should happen well before the 10s sleep finishes"
    );
    assert_eq!(result.stdout.lines(), ["started"]);
    assert!(result.stdout.is_sealed());
    assert!(result.stderr.is_sealed());
    // Exit code after a requested kill is advisory only and platform
    // dependent; it is deliberately not asserted here.
}

#[tokio::test]
async fn cancel_before_start_still_returns_captured_state() {
    // Token already fired when supervision begins: the streams seal with
    // whatever arrived (possibly nothing) and the process is killed.
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        supervise(sh("sleep 10"), LineHooks::default(), cancel),
    )
    .await
    .expect("must not hang")
    .unwrap();

    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());
}

#[tokio::test]
async fn cancel_after_natural_exit_is_a_noop() {
    let cancel = CancelToken::new();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        supervise(sh("echo done"), LineHooks::default(), cancel.clone()),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout.lines(), ["done"]);

    // The process is long gone; cancelling now must not panic and cannot
    // alter the result we already hold.
    cancel.cancel();
    assert_eq!(result.stdout.lines(), ["done"]);
    assert_eq!(result.exit_code, Some(0));
}
