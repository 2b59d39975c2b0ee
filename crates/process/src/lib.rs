// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! runner-process: local child-process supervision.
//!
//! Underlies every local-command executor backend:
//! deterministic SIGTERM→SIGKILL escalation with process-group semantics,
//! output streaming, and exit-code classification.

pub mod classify;
pub mod group;
pub mod killer;
pub mod sink;
pub mod supervisor;

pub use classify::{classify_exit, ExitCodes, ExitOutcome};
pub use killer::{force_kill, terminate, KillError, TargetProcess};
pub use sink::{NullSink, OutputSink};
pub use supervisor::{KillTimeouts, ProcessError, ProcessSupervisor, RunOutcome};
