// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Per-job output sink with masking and a terminal state machine.

use crate::offset_log::OffsetLog;
use crate::scrub;
use parking_lot::Mutex;
use runner_core::FailureKind;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceState {
    Running,
    Finishing,
    Finished,
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace is already finished; write rejected")]
    Finished,
}

/// Terminal outcome of a `JobTrace`.
#[derive(Debug, Clone)]
pub enum TraceOutcome {
    Success,
    Failed { message: String, kind: FailureKind },
}

struct Inner {
    state: TraceState,
    masked: Vec<Vec<u8>>,
    sent_offset: u64,
    outcome: Option<TraceOutcome>,
    cancel_fn: Option<Box<dyn FnMut() + Send>>,
    failures_collector: Option<Box<dyn FnMut(&TraceOutcome) + Send>>,
}

/// Append-only output sink for one job's trace. Offsets are monotonic and
/// reported back to the coordinator on each incremental upload.
pub struct JobTrace {
    log: OffsetLog,
    is_stdout: bool,
    inner: Mutex<Inner>,
}

impl JobTrace {
    pub fn new(is_stdout: bool) -> Self {
        Self {
            log: OffsetLog::new(),
            is_stdout,
            inner: Mutex::new(Inner {
                state: TraceState::Running,
                masked: Vec::new(),
                sent_offset: 0,
                outcome: None,
                cancel_fn: None,
                failures_collector: None,
            }),
        }
    }

    pub fn is_stdout(&self) -> bool {
        self.is_stdout
    }

    /// Replace the set of substrings masked at write time. Variable values
    /// flagged masked and credentialed URLs both funnel through here.
    pub fn set_masked(&self, patterns: Vec<String>) {
        let mut inner = self.inner.lock();
        inner.masked = patterns.into_iter().map(String::into_bytes).collect();
    }

    pub fn set_cancel_fn(&self, f: impl FnMut() + Send + 'static) {
        self.inner.lock().cancel_fn = Some(Box::new(f));
    }

    pub fn set_failures_collector(&self, f: impl FnMut(&TraceOutcome) + Send + 'static) {
        self.inner.lock().failures_collector = Some(Box::new(f));
    }

    /// Invoked by the coordinator-client's patch-trace uploader when a
    /// response indicates the job was canceled — the canonical way
    /// coordinator-originated cancellation enters the agent.
    pub fn signal_cancel(&self) {
        let mut taken = self.inner.lock().cancel_fn.take();
        if let Some(f) = taken.as_mut() {
            f();
        }
        self.inner.lock().cancel_fn = taken;
    }

    /// Append bytes to the trace, scrubbing masked substrings first.
    /// Rejected once the trace has reached `Finished`.
    pub fn write(&self, bytes: &[u8]) -> Result<(u64, u64), TraceError> {
        let masked = {
            let inner = self.inner.lock();
            if inner.state == TraceState::Finished {
                return Err(TraceError::Finished);
            }
            inner.masked.clone()
        };
        let scrubbed = scrub::scrub(bytes, &masked);
        Ok(self.log.append(&scrubbed))
    }

    /// Bytes appended since the last call to `take_pending_upload`, marking
    /// them as sent. Used by the periodic `patchTrace` uploader.
    pub fn take_pending_upload(&self) -> (u64, Vec<u8>) {
        let mut inner = self.inner.lock();
        let start = inner.sent_offset;
        let bytes = self.log.tail_from(start);
        inner.sent_offset = self.log.len();
        (start, bytes)
    }

    /// Move to `Finishing`: no further writes are accepted by callers that
    /// check `is_finishing`, though the final tail is still collectible via
    /// `take_pending_upload` for the last upload.
    pub fn begin_finishing(&self) {
        let mut inner = self.inner.lock();
        if inner.state == TraceState::Running {
            inner.state = TraceState::Finishing;
        }
    }

    pub fn success(&self) {
        self.finish(TraceOutcome::Success);
    }

    pub fn fail(&self, message: impl fmt::Display, kind: FailureKind) {
        self.finish(TraceOutcome::Failed {
            message: message.to_string(),
            kind,
        });
    }

    fn finish(&self, outcome: TraceOutcome) {
        let mut inner = self.inner.lock();
        if inner.state == TraceState::Finished {
            return;
        }
        if let Some(collector) = inner.failures_collector.as_mut() {
            collector(&outcome);
        }
        inner.outcome = Some(outcome);
        inner.state = TraceState::Finished;
    }

    pub fn outcome(&self) -> Option<TraceOutcome> {
        self.inner.lock().outcome.clone()
    }

    pub fn current_offset(&self) -> u64 {
        self.log.len()
    }
}

/// `std::io::Write` bridge so the build logger can use `write!`/`writeln!`
/// against a trace the same way it would against any other sink.
impl io::Write for &JobTrace {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        JobTrace::write(self, buf)
            .map(|_| buf.len())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_trace_tests.rs"]
mod tests;
