// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Error types for the build driver and its collaborators.

use runner_core::FailureKind;
use thiserror::Error;

/// A stage-level failure, already classified the way the driver needs it:
/// as a build failure (the job itself is at fault) or a system failure
/// (the agent's environment is at fault, eligible for coordinator retry).
#[derive(Debug, Error, Clone)]
pub enum StageError {
    #[error("{0}")]
    Build(String),
    #[error("{0}")]
    System(String),
    #[error("step timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("{0}")]
    Unknown(String),
}

impl StageError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            StageError::Build(_) => FailureKind::ScriptFailure,
            StageError::System(_) => FailureKind::RunnerSystemFailure,
            StageError::Timeout(_) => FailureKind::JobExecutionTimeout,
            StageError::Unknown(_) => FailureKind::UnknownFailure,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("acquiring executor: {0}")]
    Acquire(String),
    #[error("requesting job: {0}")]
    RequestJob(String),
    #[error("process error: {0}")]
    Process(#[from] runner_process::ProcessError),
    #[error("stage error: {0}")]
    Stage(#[from] StageError),
}
