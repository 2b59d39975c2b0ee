// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Wires a granted job to a running [`BuildDriver`], uploading its trace on
//! a timer and reporting terminal status once the driver finishes.

use async_trait::async_trait;
use runner_core::{FailureKind, Job, JobId, JobStatus, RunnerConfig};
use runner_engine::{Build, BuildDriver, BuildOutcome, BuildSpawner, Executor};
use runner_logging::{BuildLogger, JobTrace, TraceOutcome};
use runner_network::{CoordinatorClient, EndpointBackoff};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TRACE_UPDATE_INTERVAL: Duration = Duration::from_secs(3);

pub struct AgentBuildSpawner {
    pub client: CoordinatorClient,
    pub backoff: Arc<EndpointBackoff>,
    pub agent_cancel: CancellationToken,
}

#[async_trait]
impl BuildSpawner for AgentBuildSpawner {
    async fn spawn(
        &self,
        runner: RunnerConfig,
        job: Job,
        executor: Box<dyn Executor>,
        build_cancel: CancellationToken,
    ) {
        let job_id = job.id.clone();
        let job_token = job.token.clone();
        let span = tracing::info_span!("build", runner = %runner.name, job = %job_id);

        let trace = Arc::new(JobTrace::new(false));
        let logger = BuildLogger::new(Some(trace.clone()), span.clone());

        let uploader_stop = CancellationToken::new();
        let uploader = tokio::spawn(trace_upload_loop(
            self.client.clone(),
            self.backoff.clone(),
            job_id.clone(),
            job_token.clone(),
            trace.clone(),
            uploader_stop.clone(),
        ));

        let build = Build::new(runner.name.as_str().to_string(), build_cancel.clone());
        let driver = BuildDriver::new(
            build,
            job,
            executor,
            trace.clone(),
            logger,
            self.agent_cancel.clone(),
        );

        span.in_scope(|| tracing::info!("starting build"));
        let outcome = driver.run().await;

        uploader_stop.cancel();
        let _ = uploader.await;

        let (offset, bytes) = trace.take_pending_upload();
        if !bytes.is_empty() {
            match self
                .client
                .patch_trace(&self.backoff, &job_id, &job_token, offset, &bytes)
                .await
            {
                Ok(true) => trace.signal_cancel(),
                Ok(false) => {}
                Err(e) => tracing::warn!(job = %job_id, error = %e, "final trace upload failed"),
            }
        }

        let (status, failure_reason) = terminal_status(&trace, build_cancel.is_cancelled());
        match &outcome {
            BuildOutcome::Success => tracing::info!(job = %job_id, "build succeeded"),
            BuildOutcome::Failed(e) => tracing::info!(job = %job_id, error = %e, "build failed"),
        }

        if let Err(e) = self
            .client
            .update_job_status(&self.backoff, &job_id, &job_token, status, failure_reason)
            .await
        {
            tracing::error!(job = %job_id, error = %e, "failed to report job status");
        }
    }
}

fn terminal_status(trace: &JobTrace, was_canceled: bool) -> (JobStatus, Option<FailureKind>) {
    match trace.outcome() {
        Some(TraceOutcome::Success) => (JobStatus::Success, None),
        Some(TraceOutcome::Failed { .. }) if was_canceled => (JobStatus::Canceled, None),
        Some(TraceOutcome::Failed { kind, .. }) => (JobStatus::Failed, Some(kind)),
        None => (JobStatus::Failed, Some(FailureKind::UnknownFailure)),
    }
}

async fn trace_upload_loop(
    client: CoordinatorClient,
    backoff: Arc<EndpointBackoff>,
    job_id: JobId,
    job_token: String,
    trace: Arc<JobTrace>,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(TRACE_UPDATE_INTERVAL) => {}
            _ = stop.cancelled() => return,
        }
        let (offset, bytes) = trace.take_pending_upload();
        if bytes.is_empty() {
            continue;
        }
        match client
            .patch_trace(&backoff, &job_id, &job_token, offset, &bytes)
            .await
        {
            Ok(true) => trace.signal_cancel(),
            Ok(false) => {}
            Err(e) => tracing::warn!(job = %job_id, error = %e, "trace upload failed"),
        }
    }
}
