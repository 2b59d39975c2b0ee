// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Failure-kind vocabulary reported back to the coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The terminal reason a job failed, as uploaded in the final `patchTrace`
/// / job-status call. Distinct from the richer `StageError` the driver
/// works with internally (`runner-engine::stage::StageError`) — this is
/// just the wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ScriptFailure,
    RunnerSystemFailure,
    JobExecutionTimeout,
    UnknownFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::ScriptFailure => "script_failure",
            FailureKind::RunnerSystemFailure => "runner_system_failure",
            FailureKind::JobExecutionTimeout => "job_execution_timeout",
            FailureKind::UnknownFailure => "unknown_failure",
        };
        f.write_str(s)
    }
}

/// Terminal status uploaded for a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Success,
    Failed,
    Canceled,
}
