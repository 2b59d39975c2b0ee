// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! JSON payload shapes exchanged with the coordinator.

use runner_core::{ArtifactDirective, CacheDirective, GitInfo, Job, JobId, Service, Step};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub(crate) struct RequestJobPayload<'a> {
    pub token: &'a str,
}

/// Shape of a granted job as returned by `POST /jobs/request`. Field names
/// mirror the coordinator's JSON, which is why `git_info` doesn't match
/// `Job::git`.
#[derive(Debug, Deserialize)]
pub(crate) struct JobResponseWire {
    pub id: String,
    pub token: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub masked_variables: Vec<String>,
    pub git_info: GitInfo,
    #[serde(default)]
    pub artifacts: Vec<ArtifactDirective>,
    #[serde(default)]
    pub cache: Vec<CacheDirective>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl JobResponseWire {
    pub(crate) fn into_job(self) -> Job {
        Job {
            id: JobId::new(self.id),
            token: self.token,
            steps: self.steps,
            variables: self.variables,
            masked_variables: self.masked_variables,
            git: self.git_info,
            artifacts: self.artifacts,
            caches: self.cache,
            services: self.services,
        }
    }
}

/// Shape of a `PATCH /jobs/:id/trace` response body. An empty or
/// unparseable body is treated as "no cancel" rather than an error, since
/// a successful upload commonly returns no body at all.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PatchTraceResponseWire {
    #[serde(default)]
    pub cancel: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobStatusPayload<'a> {
    pub token: &'a str,
    pub status: runner_core::JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<runner_core::FailureKind>,
}
