// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! The Executor contract each backend implements, and a shell-command
//! backend built on `runner-process`.

use crate::error::{EngineError, StageError};
use async_trait::async_trait;
use runner_core::{RunnerConfig, Step};
use runner_logging::BuildLogger;
use runner_process::{ExitCodes, ExitOutcome, NullSink, OutputSink, ProcessSupervisor};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of running a single step's script.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Success,
    Failed(StageError),
    Canceled,
}

/// One backend's way of preparing, running, and tearing down a build.
/// `prepare`/`cleanup` bracket the whole Build; `run_step` is called once
/// per user step in `user-step-script`.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn prepare(&mut self) -> Result<(), StageError>;

    async fn run_step(
        &mut self,
        step: &Step,
        logger: &BuildLogger,
        cancel: CancellationToken,
    ) -> StepOutcome;

    async fn cleanup(&mut self) -> Result<(), StageError>;
}

/// Hands out and reclaims backend resource handles. Every `acquire` that
/// succeeds must be matched by exactly one `release` — the driver releases
/// on every exit path via `cleanup-executor`.
#[async_trait]
pub trait ExecutorProvider: Send + Sync {
    async fn acquire(&self, runner: &RunnerConfig) -> Result<Box<dyn Executor>, EngineError>;

    async fn release(&self, executor: Box<dyn Executor>);
}

/// Runs each step as `bash -c <script>` in a plain child process. The
/// reference backend named by `ExecutorKind::Shell`.
pub struct ShellExecutor {
    supervisor: ProcessSupervisor,
    workdir: std::path::PathBuf,
    env: Vec<(String, String)>,
}

impl ShellExecutor {
    pub fn new(workdir: std::path::PathBuf, env: Vec<(String, String)>) -> Self {
        Self {
            supervisor: ProcessSupervisor::new(ExitCodes::default(), Default::default()),
            workdir,
            env,
        }
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn prepare(&mut self) -> Result<(), StageError> {
        tokio::fs::create_dir_all(&self.workdir)
            .await
            .map_err(|e| StageError::System(format!("preparing workdir: {e}")))?;
        Ok(())
    }

    async fn run_step(
        &mut self,
        step: &Step,
        logger: &BuildLogger,
        cancel: CancellationToken,
    ) -> StepOutcome {
        let script = step.script.join("\n");
        let mut cmd = ProcessSupervisor::command("bash");
        cmd.arg("-c").arg(&script).current_dir(&self.workdir);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => return StepOutcome::Failed(StageError::System(format!("spawning step: {e}"))),
        };

        struct LogSink(BuildLogger);
        impl OutputSink for LogSink {
            fn write(&self, chunk: &[u8]) {
                for line in String::from_utf8_lossy(chunk).lines() {
                    self.0.println(line);
                }
            }
        }
        let stdout_sink: Arc<dyn OutputSink> = Arc::new(LogSink(logger.clone()));
        let stderr_sink: Arc<dyn OutputSink> = Arc::new(NullSink);

        match self
            .supervisor
            .run(child, cancel, stdout_sink, stderr_sink)
            .await
        {
            Ok(runner_process::RunOutcome::Exited(outcome)) => match outcome {
                ExitOutcome::Success => StepOutcome::Success,
                ExitOutcome::BuildError { .. } => {
                    StepOutcome::Failed(StageError::Build(outcome.to_string()))
                }
                ExitOutcome::SystemError { .. } => {
                    StepOutcome::Failed(StageError::System(outcome.to_string()))
                }
                ExitOutcome::UnknownFailure { .. } => {
                    StepOutcome::Failed(StageError::Unknown(outcome.to_string()))
                }
            },
            Ok(runner_process::RunOutcome::Canceled) => StepOutcome::Canceled,
            Err(e) => StepOutcome::Failed(StageError::System(e.to_string())),
        }
    }

    async fn cleanup(&mut self) -> Result<(), StageError> {
        Ok(())
    }
}

/// Acquires a fresh [`ShellExecutor`] per build; releasing is a no-op since
/// the handle owns no pooled resource.
pub struct ShellExecutorProvider {
    pub builds_dir: std::path::PathBuf,
}

#[async_trait]
impl ExecutorProvider for ShellExecutorProvider {
    async fn acquire(&self, runner: &RunnerConfig) -> Result<Box<dyn Executor>, EngineError> {
        let workdir = self.builds_dir.join(runner.name.as_str());
        Ok(Box::new(ShellExecutor::new(workdir, Vec::new())))
    }

    async fn release(&self, _executor: Box<dyn Executor>) {}
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
