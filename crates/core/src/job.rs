// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Job payload as granted by the coordinator.
//!
//! A [`Job`] is immutable once acquired: the driver and every stage only
//! ever read from it. Mutable, per-run state (current stage, cancellation
//! handle, failure collector) lives on `Build` in the `runner-engine` crate.

use crate::id::JobId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Governs whether a step runs given the outcome of prior steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhenPolicy {
    OnSuccess,
    OnFailure,
    Always,
    Manual,
}

impl Default for WhenPolicy {
    fn default() -> Self {
        WhenPolicy::OnSuccess
    }
}

/// One script step within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub script: Vec<String>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    #[serde(default)]
    pub when: WhenPolicy,
    #[serde(default)]
    pub allow_failure: bool,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// Git metadata for the commit a job is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitInfo {
    pub sha: String,
    pub before_sha: String,
    pub r#ref: String,
    pub repo_url: String,
}

/// A directive to restore or archive a named cache path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheDirective {
    pub key: String,
    pub paths: Vec<String>,
}

/// A directive to download or upload named artifact paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDirective {
    pub name: String,
    pub paths: Vec<String>,
    #[serde(default)]
    pub when: WhenPolicy,
}

/// A background service container requested alongside the job (opaque to
/// the core; the executor backend interprets it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub alias: Option<String>,
}

/// A unit of work fetched from the coordinator. Immutable after acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub token: String,
    pub steps: Vec<Step>,
    pub variables: HashMap<String, String>,
    /// Variable names whose values must be scrubbed from trace output.
    #[serde(default)]
    pub masked_variables: Vec<String>,
    pub git: GitInfo,
    #[serde(default)]
    pub artifacts: Vec<ArtifactDirective>,
    #[serde(default)]
    pub caches: Vec<CacheDirective>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Job {
    /// Steps that should run given the overall build outcome so far,
    /// honoring each step's `when` policy. `Manual` steps are never
    /// auto-selected; they are included only when explicitly retried.
    pub fn steps_for_outcome(&self, build_failed: bool) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| match s.when {
            WhenPolicy::OnSuccess => !build_failed,
            WhenPolicy::OnFailure => build_failed,
            WhenPolicy::Always => true,
            WhenPolicy::Manual => false,
        })
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
