// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Fan-out build logger: structured logging + colored trace framing +
//! secret scrubbing.

use crate::job_trace::JobTrace;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod ansi {
    pub const RESET: &str = "\x1b[0;m";
    pub const CLEAR: &str = "\x1b[0;m";
    pub const BOLD_GREEN: &str = "\x1b[1;32m";
    pub const BOLD_CYAN: &str = "\x1b[1;36m";
    pub const BOLD_RED: &str = "\x1b[1;31m";
}

/// `YYYY-MM-DD HH:MM:SS UTC` without pulling in a datetime crate the rest
/// of the workspace doesn't otherwise need — this is a trace-framing
/// timestamp, not data the coordinator parses.
fn current_formatted_time() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let days = secs / 86_400;
    let time_of_day = secs % 86_400;
    let (h, m, s) = (time_of_day / 3600, (time_of_day % 3600) / 60, time_of_day % 60);
    // Civil-from-days (Howard Hinnant's algorithm), good for any date the
    // coordinator will ever see in a trace line.
    let z = days as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { y + 1 } else { y };
    format!("{year:04}-{month:02}-{d:02} {h:02}:{m:02}:{s:02} UTC")
}

/// Fans output to a [`JobTrace`] (colored, scrubbed, timestamp-framed) and
/// to `tracing` at the matching severity. `trace` is `None` for contexts
/// with no active job (e.g. agent-level startup logging).
#[derive(Clone)]
pub struct BuildLogger {
    trace: Option<Arc<JobTrace>>,
    span: tracing::Span,
}

impl BuildLogger {
    pub fn new(trace: Option<Arc<JobTrace>>, span: tracing::Span) -> Self {
        Self { trace, span }
    }

    fn send_raw(&self, s: &str) {
        if let Some(trace) = &self.trace {
            let _ = trace.write(s.as_bytes());
        }
    }

    /// Shared trace-framing + structured-log dispatch: every
    /// severity but `Debugln` writes a timestamp-framed, colored trace
    /// line and then (unless the trace target is stdout, to avoid double
    /// printing) calls the structured logger too.
    fn send_log(&self, prefix: &str, line: &str, structured: impl FnOnce(&tracing::Span, &str)) {
        let has_trace = self.trace.is_some();
        if has_trace {
            self.send_raw(&format!(
                "{}{}{}\n",
                ansi::BOLD_CYAN,
                current_formatted_time(),
                ansi::RESET
            ));
            self.send_raw(&format!("{prefix}{line}\n"));
            self.send_raw(ansi::RESET);
        }
        if has_trace && self.trace.as_ref().map(|t| t.is_stdout()).unwrap_or(false) {
            return;
        }
        structured(&self.span, line);
    }

    /// Structured debug only; never reaches the trace.
    pub fn debugln(&self, line: &str) {
        self.span.in_scope(|| tracing::debug!("{}", line));
    }

    pub fn println(&self, line: &str) {
        self.send_log(ansi::CLEAR, line, |span, l| {
            span.in_scope(|| tracing::debug!("{}", l))
        });
    }

    pub fn infoln(&self, line: &str) {
        self.send_log(ansi::BOLD_GREEN, line, |span, l| {
            span.in_scope(|| tracing::info!("{}", l))
        });
    }

    pub fn warningln(&self, line: &str) {
        self.send_log(&format!("{}WARNING: ", ansi::BOLD_CYAN), line, |span, l| {
            span.in_scope(|| tracing::warn!("{}", l))
        });
    }

    /// A handled-but-notable error: trace gets the red "ERROR:" framing,
    /// but structurally it's only a warning (the driver is still going to
    /// recover from this).
    pub fn soft_errorln(&self, line: &str) {
        self.send_log(&format!("{}ERROR: ", ansi::BOLD_RED), line, |span, l| {
            span.in_scope(|| tracing::warn!("{}", l))
        });
    }

    pub fn errorln(&self, line: &str) {
        self.send_log(&format!("{}ERROR: ", ansi::BOLD_RED), line, |span, l| {
            span.in_scope(|| tracing::error!("{}", l))
        });
    }
}

#[cfg(test)]
#[path = "build_logger_tests.rs"]
mod tests;
