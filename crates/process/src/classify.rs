// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Exit-code classification.

use std::fmt;

/// Well-known exit codes a local-command backend injects into the child's
/// environment and classifies on exit.
#[derive(Debug, Clone, Copy)]
pub struct ExitCodes {
    pub build_failure: i32,
    pub system_failure: i32,
}

impl Default for ExitCodes {
    fn default() -> Self {
        Self {
            build_failure: 1,
            system_failure: 2,
        }
    }
}

/// Classification of a child's natural exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    BuildError { code: i32 },
    SystemError { code: i32 },
    /// An exit code the backend didn't recognize, or a `None` code on Unix
    /// (the child was killed by a signal rather than calling `exit`).
    UnknownFailure { code: Option<i32>, detail: String },
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => write!(f, "success"),
            ExitOutcome::BuildError { code } => write!(f, "build error, exit code {code}"),
            ExitOutcome::SystemError { code } => write!(f, "system error, exit code {code}"),
            ExitOutcome::UnknownFailure { code, detail } => write!(
                f,
                "unknown Custom executor executable exit code {}; executable execution terminated with: {}",
                code.map(|c| c.to_string()).unwrap_or_else(|| "<none>".to_string()),
                detail
            ),
        }
    }
}

/// Classify a process's exit status.
///
/// `raw_detail` is the platform's textual description of the wait result
/// (e.g. `exit status 0` on Unix when a non-nil error accompanies a zero
/// code) and is folded verbatim into `UnknownFailure` so the message
/// matches the coordinator-facing error format byte-for-byte.
pub fn classify_exit(code: Option<i32>, codes: ExitCodes, raw_detail: &str) -> ExitOutcome {
    match code {
        Some(0) => ExitOutcome::Success,
        Some(c) if c == codes.build_failure => ExitOutcome::BuildError { code: c },
        Some(c) if c == codes.system_failure => ExitOutcome::SystemError { code: c },
        other => ExitOutcome::UnknownFailure {
            code: other,
            detail: raw_detail.to_string(),
        },
    }
}
