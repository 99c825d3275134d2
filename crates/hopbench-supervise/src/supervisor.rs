// SPDX-License-Identifier: MIT OR Apache-2.0
//! The process supervisor: spawn, capture, exit, cancel, assemble.

use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::complete::Completion;
use crate::error::SuperviseError;
use crate::result::ProcessResult;
use crate::spec::ProcessSpec;
use crate::stream::{CapturedStream, spawn_line_reader};

/// Per-line observer invoked synchronously as each line arrives, before the
/// line is appended to its captured stream.
pub type LineHook = Box<dyn FnMut(&str) + Send>;

/// Optional per-line hooks for a supervised process.
///
/// Panics raised by a hook are NOT caught: they unwind straight through the
/// supervise future into the caller's scheduling context. Keep hooks
/// non-panicking or accept that propagation.
#[derive(Default)]
pub struct LineHooks {
    /// Observer for stdout lines.
    pub on_stdout: Option<LineHook>,
    /// Observer for stderr lines.
    pub on_stderr: Option<LineHook>,
}

enum Event {
    Cancelled,
    Exited(std::io::Result<std::process::ExitStatus>),
    StdoutLine(Option<String>),
    StderrLine(Option<String>),
}

/// Supervise one external process to completion.
///
/// Spawns `spec.command`, forces both stdout and stderr into supervised
/// pipes (the process never inherits the parent's terminal), collects each
/// stream line-by-line, and resolves once all three completion signals have
/// arrived: stdout sealed, stderr sealed, exit observed — in any order.
///
/// If `cancel` fires while the process is running, both captured streams
/// are sealed with the lines collected so far and the process is killed.
/// Sealing happens before the kill so completion can never wait on pipes
/// that will no longer close naturally. A kill aimed at an already-exited
/// process is a no-op, and a result that was already produced is never
/// altered.
///
/// Fails with [`SuperviseError::Launch`] when the OS process cannot be
/// created; no stream reading is attempted in that case.
pub async fn supervise(
    spec: ProcessSpec,
    mut hooks: LineHooks,
    cancel: CancelToken,
) -> Result<ProcessResult, SuperviseError> {
    let mut cmd = Command::new(&spec.command);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    // Overrides merge onto the inherited environment; an override wins on
    // key collision.
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(|source| SuperviseError::Launch {
        command: spec.command.clone(),
        source,
    })?;

    let stdout = child.stdout.take().ok_or(SuperviseError::Stdio("stdout"))?;
    let stderr = child.stderr.take().ok_or(SuperviseError::Stdio("stderr"))?;

    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    // Readers are detached; they exit on EOF or when the receivers drop.
    let _out_reader = spawn_line_reader(stdout, out_tx, "stdout");
    let _err_reader = spawn_line_reader(stderr, err_tx, "stderr");

    let completion = Completion::new();

    // `Some` while the stream is still collecting; taken on seal.
    let mut stdout_cap = Some(CapturedStream::new());
    let mut stderr_cap = Some(CapturedStream::new());
    let mut out_open = true;
    let mut err_open = true;
    let mut exited = false;
    let mut cancel_fired = false;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled(), if !cancel_fired => Event::Cancelled,
            status = child.wait(), if !exited => Event::Exited(status),
            line = out_rx.recv(), if out_open => Event::StdoutLine(line),
            line = err_rx.recv(), if err_open => Event::StderrLine(line),
        };

        match event {
            Event::Cancelled => {
                cancel_fired = true;
                // Seal first: once the process is killed these pipes may
                // never close on their own, and completion must not wait
                // on them.
                if let Some(mut cap) = stdout_cap.take() {
                    cap.seal();
                    completion.offer_stdout(cap);
                }
                if let Some(mut cap) = stderr_cap.take() {
                    cap.seal();
                    completion.offer_stderr(cap);
                }
                // No-op if the process already exited.
                let _ = child.start_kill();
                debug!(target: "hopbench.supervise", command = %spec.command, "cancellation: streams sealed, kill requested");
            }
            Event::Exited(status) => {
                exited = true;
                let status = status.map_err(SuperviseError::Wait)?;
                completion.offer_exit(status.code());
                debug!(target: "hopbench.supervise", command = %spec.command, code = ?status.code(), "process exited");
            }
            Event::StdoutLine(Some(line)) => {
                if let Some(cap) = stdout_cap.as_mut() {
                    if let Some(hook) = hooks.on_stdout.as_mut() {
                        hook(&line);
                    }
                    cap.push(line);
                }
            }
            Event::StdoutLine(None) => {
                out_open = false;
                if let Some(mut cap) = stdout_cap.take() {
                    cap.seal();
                    completion.offer_stdout(cap);
                }
            }
            Event::StderrLine(Some(line)) => {
                if let Some(cap) = stderr_cap.as_mut() {
                    if let Some(hook) = hooks.on_stderr.as_mut() {
                        hook(&line);
                    }
                    cap.push(line);
                }
            }
            Event::StderrLine(None) => {
                err_open = false;
                if let Some(mut cap) = stderr_cap.take() {
                    cap.seal();
                    completion.offer_stderr(cap);
                }
            }
        }

        if let Some(result) = completion.try_take() {
            return Ok(result);
        }
    }
}
