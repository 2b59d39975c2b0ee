// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Runtime binding of one Job to one RunnerConfig, and the registry that
//! tracks how many are active per runner.

use crate::stage::Stage;
use parking_lot::Mutex;
use runner_core::{JobId, RunnerName};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

/// Single mutex guarding the counter and id set; every operation is O(1).
#[derive(Default)]
pub struct BuildsRegistry {
    inner: Mutex<HashMap<RunnerName, HashSet<JobId>>>,
}

impl BuildsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_build_limit_met(&self, runner: &RunnerName, limit: u32) -> bool {
        let inner = self.inner.lock();
        inner.get(runner).map(|s| s.len() as u32).unwrap_or(0) >= limit
    }

    pub fn active_count(&self, runner: &RunnerName) -> usize {
        self.inner.lock().get(runner).map(|s| s.len()).unwrap_or(0)
    }

    /// Register a newly granted job under `runner`. Acquire's result is
    /// paired with release on every error path before this call — once a
    /// job is registered, `Build`/`BuildDriver` owns its release via
    /// `unregister`.
    pub fn register(&self, runner: &RunnerName, job: JobId) {
        self.inner
            .lock()
            .entry(runner.clone())
            .or_default()
            .insert(job);
    }

    pub fn unregister(&self, runner: &RunnerName, job: &JobId) {
        let mut inner = self.inner.lock();
        if let Some(set) = inner.get_mut(runner) {
            set.remove(job);
        }
    }
}

/// Runtime binding of one Job to one RunnerConfig and one Executor. Created
/// on acquisition, destroyed after `cleanup-executor`; owns the Executor
/// exclusively for its lifetime.
pub struct Build {
    pub project_name: String,
    pub hostname: Option<String>,
    pub current_stage: Mutex<Option<Stage>>,
    pub cancel: CancellationToken,
}

impl Build {
    pub fn new(project_name: String, cancel: CancellationToken) -> Self {
        Self {
            project_name,
            hostname: None,
            current_stage: Mutex::new(None),
            cancel,
        }
    }

    /// Recorded by the driver as it walks the fixed stage sequence;
    /// observable for metrics.
    pub fn set_current_stage(&self, stage: Stage) {
        *self.current_stage.lock() = Some(stage);
    }

    pub fn current_stage(&self) -> Option<Stage> {
        *self.current_stage.lock()
    }
}
