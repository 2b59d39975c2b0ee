// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! The coordinator HTTP/JSON client: polling, trace upload, status update.

use crate::endpoint_backoff::EndpointBackoff;
use crate::error::NetworkError;
use crate::transport::{CoordinatorTransport, HttpRequest, HttpResponse};
use crate::url_fix::fix_ci_url;
use crate::wire::{JobResponseWire, JobStatusPayload, PatchTraceResponseWire, RequestJobPayload};
use async_trait::async_trait;
use reqwest::Method;
use runner_core::{FailureKind, Job, JobId, JobStatus, RunnerConfig};
use runner_engine::{EngineError, JobSource};
use std::sync::Arc;

const LAST_UPDATE_HEADER: &str = "X-GitLab-Last-Update";

#[derive(Clone)]
pub struct CoordinatorClient {
    transport: Arc<dyn CoordinatorTransport>,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(transport: Arc<dyn CoordinatorTransport>, url: &str) -> Self {
        Self {
            transport,
            base_url: fix_ci_url(url),
        }
    }

    async fn execute(
        &self,
        backoff: &EndpointBackoff,
        method: Method,
        path: &str,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, NetworkError> {
        let url = format!("{}{}", self.base_url, path);
        let key = (method.clone(), url.clone());
        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        let response = self.transport.send(request).await?;
        if (400..=599).contains(&response.status) {
            let delay = backoff.next_delay(&key);
            tokio::time::sleep(delay).await;
        } else {
            backoff.reset(&key);
        }
        Ok(response)
    }

    pub async fn verify_runner(
        &self,
        backoff: &EndpointBackoff,
        runner: &RunnerConfig,
    ) -> Result<(), NetworkError> {
        let body = serde_json::to_vec(&RequestJobPayload { token: &runner.token })
            .map_err(NetworkError::Encode)?;
        let response = self
            .execute(
                backoff,
                Method::POST,
                "/runners/verify",
                vec![("Content-Type".to_string(), "application/json".to_string())],
                Some(body),
            )
            .await?;
        if !(200..300).contains(&response.status) {
            return Err(NetworkError::UnexpectedStatus(response.status));
        }
        Ok(())
    }

    /// Polls for a job. `Ok(None)` is the no-job-granted response (a
    /// `204`/`404`); a transport error or unexpected status is surfaced so
    /// the caller can apply its own backoff-and-retry policy.
    pub async fn request_job(
        &self,
        backoff: &EndpointBackoff,
        runner: &RunnerConfig,
        last_update: Option<&str>,
    ) -> Result<Option<(Job, Option<String>)>, NetworkError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(cursor) = last_update {
            headers.push((LAST_UPDATE_HEADER.to_string(), cursor.to_string()));
        }
        let body = serde_json::to_vec(&RequestJobPayload { token: &runner.token })
            .map_err(NetworkError::Encode)?;

        let response = self
            .execute(backoff, Method::POST, "/jobs/request", headers, Some(body))
            .await?;

        if response.status == 204 || response.status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&response.status) {
            return Err(NetworkError::UnexpectedStatus(response.status));
        }

        let cursor = response.header(LAST_UPDATE_HEADER).map(str::to_string);
        let wire: JobResponseWire =
            serde_json::from_slice(&response.body).map_err(NetworkError::Decode)?;
        Ok(Some((wire.into_job(), cursor)))
    }

    /// Uploads a trace chunk. Returns `true` when the coordinator's
    /// response indicates the job has been canceled — the canonical way
    /// coordinator-originated cancellation enters the agent.
    pub async fn patch_trace(
        &self,
        backoff: &EndpointBackoff,
        job_id: &JobId,
        job_token: &str,
        start_offset: u64,
        bytes: &[u8],
    ) -> Result<bool, NetworkError> {
        let headers = vec![
            ("Content-Type".to_string(), "text/plain".to_string()),
            (
                "Content-Range".to_string(),
                format!("{}-{}", start_offset, start_offset + bytes.len() as u64),
            ),
            ("JOB-TOKEN".to_string(), job_token.to_string()),
        ];
        let path = format!("/jobs/{}/trace", job_id.as_str());
        let response = self
            .execute(backoff, Method::PATCH, &path, headers, Some(bytes.to_vec()))
            .await?;
        if !(200..300).contains(&response.status) {
            return Err(NetworkError::UnexpectedStatus(response.status));
        }
        let cancel = if response.body.is_empty() {
            false
        } else {
            serde_json::from_slice::<PatchTraceResponseWire>(&response.body)
                .map(|wire| wire.cancel)
                .unwrap_or(false)
        };
        Ok(cancel)
    }

    pub async fn update_job_status(
        &self,
        backoff: &EndpointBackoff,
        job_id: &JobId,
        job_token: &str,
        status: JobStatus,
        failure_reason: Option<FailureKind>,
    ) -> Result<(), NetworkError> {
        let body = serde_json::to_vec(&JobStatusPayload {
            token: job_token,
            status,
            failure_reason,
        })
        .map_err(NetworkError::Encode)?;
        let path = format!("/jobs/{}", job_id.as_str());
        let response = self
            .execute(
                backoff,
                Method::PUT,
                &path,
                vec![("Content-Type".to_string(), "application/json".to_string())],
                Some(body),
            )
            .await?;
        if !(200..300).contains(&response.status) {
            return Err(NetworkError::UnexpectedStatus(response.status));
        }
        Ok(())
    }
}

/// Adapts [`CoordinatorClient`] to the acquisition loop's narrow polling
/// contract. `backoff` is shared with whatever else calls through the same
/// `CoordinatorClient` (trace uploads, status updates) so every endpoint on
/// this coordinator draws from one backoff map, not one per call site.
pub struct CoordinatorJobSource {
    client: CoordinatorClient,
    backoff: Arc<EndpointBackoff>,
}

impl CoordinatorJobSource {
    pub fn new(client: CoordinatorClient, backoff: Arc<EndpointBackoff>) -> Self {
        Self { client, backoff }
    }
}

#[async_trait]
impl JobSource for CoordinatorJobSource {
    async fn request_job(
        &self,
        runner: &RunnerConfig,
        last_update: Option<&str>,
    ) -> Result<Option<(Job, Option<String>)>, EngineError> {
        self.client
            .request_job(&self.backoff, runner, last_update)
            .await
            .map_err(|e| EngineError::RequestJob(e.to_string()))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
