// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! The process supervisor: start/stream/kill a local child process.

use crate::classify::{classify_exit, ExitCodes, ExitOutcome};
use crate::group;
use crate::killer::{self, KillError, TargetProcess};
use crate::sink::OutputSink;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process not started yet")]
    NotStarted,
    #[error("failed to kill process PID={0}, likely process is dormant")]
    Dormant(u32),
    #[error(transparent)]
    Kill(#[from] KillError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a supervised run: either the child exited on its own
/// (classified by exit code), or the run was cut short by
/// cancellation after a successful `KillAndWait`.
#[derive(Debug)]
pub enum RunOutcome {
    Exited(ExitOutcome),
    Canceled,
}

#[derive(Debug, Clone, Copy)]
pub struct KillTimeouts {
    pub graceful: Duration,
    pub force: Duration,
}

impl Default for KillTimeouts {
    fn default() -> Self {
        Self {
            graceful: Duration::from_secs(10),
            force: Duration::from_secs(10),
        }
    }
}

/// Wraps a child process with deterministic kill semantics. One instance
/// per running child; discarded after `run` returns.
pub struct ProcessSupervisor {
    exit_codes: ExitCodes,
    timeouts: KillTimeouts,
}

impl ProcessSupervisor {
    pub fn new(exit_codes: ExitCodes, timeouts: KillTimeouts) -> Self {
        Self {
            exit_codes,
            timeouts,
        }
    }

    /// Build a `Command` configured to become a process-group leader so a
    /// later `KillAndWait` can target the whole tree.
    pub fn command(program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        group::set_process_group(&mut cmd);
        cmd
    }

    /// Start the child, stream its stdout/stderr into the given sinks, and
    /// return on natural exit or `cancel` firing. Writers closing is not a
    /// termination event on its own — only the child's exit is.
    pub async fn run(
        &self,
        mut child: Child,
        cancel: CancellationToken,
        stdout_sink: Arc<dyn OutputSink>,
        stderr_sink: Arc<dyn OutputSink>,
    ) -> Result<RunOutcome, ProcessError> {
        let pid = child.id().ok_or(ProcessError::NotStarted)?;
        let is_group = group::supports_process_group();

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_task = stdout.map(|r| tokio::spawn(pump(r, stdout_sink)));
        let stderr_task = stderr.map(|r| tokio::spawn(pump(r, stderr_sink)));

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                self.kill_and_wait(&mut child, pid, is_group).await?;
                if let Some(t) = stdout_task { let _ = t.await; }
                if let Some(t) = stderr_task { let _ = t.await; }
                Ok(RunOutcome::Canceled)
            }

            wait_result = child.wait() => {
                if let Some(t) = stdout_task { let _ = t.await; }
                if let Some(t) = stderr_task { let _ = t.await; }
                let status = wait_result?;
                let detail = format!("exit status {}", status.code().unwrap_or(-1));
                Ok(RunOutcome::Exited(classify_exit(status.code(), self.exit_codes, &detail)))
            }
        }
    }

    /// Send SIGTERM, wait `graceful`, escalate to SIGKILL, wait `force`;
    /// on continued survival surface a "dormant process" error. On success,
    /// returns the child's actual wait result rather than discarding it.
    pub async fn kill_and_wait(
        &self,
        child: &mut Child,
        pid: u32,
        is_group: bool,
    ) -> Result<std::process::ExitStatus, ProcessError> {
        let target = TargetProcess { pid, is_group };

        killer::terminate(target)?;
        let after_term = tokio::time::timeout(self.timeouts.graceful, child.wait())
            .await
            .ok();
        if after_term.is_some() {
            return resolve_kill_outcome(pid, after_term, None);
        }

        killer::force_kill(target)?;
        let after_kill = tokio::time::timeout(self.timeouts.force, child.wait())
            .await
            .ok();

        resolve_kill_outcome(pid, None, after_kill)
    }
}

/// Pure decision logic for the four-step `KillAndWait` protocol, split out
/// of the async orchestration so the "ignores both signals" path (an
/// unkillable real process is impractical to construct in a test) can be
/// exercised deterministically. `after_term`/`after_kill` are `None` when
/// the respective wait timed out; `Some` carries the real wait result.
fn resolve_kill_outcome(
    pid: u32,
    after_term: Option<std::io::Result<std::process::ExitStatus>>,
    after_kill: Option<std::io::Result<std::process::ExitStatus>>,
) -> Result<std::process::ExitStatus, ProcessError> {
    match after_term.or(after_kill) {
        Some(result) => result.map_err(ProcessError::Io),
        None => Err(ProcessError::Dormant(pid)),
    }
}

async fn pump(mut reader: impl tokio::io::AsyncRead + Unpin, sink: Arc<dyn OutputSink>) {
    let mut buf = [0u8; 8 * 1024];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => sink.write(&buf[..n]),
            Err(e) => {
                tracing::warn!(error = %e, "error reading child output");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
