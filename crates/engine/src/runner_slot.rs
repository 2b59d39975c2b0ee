// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Per-runner acquisition loop: the governor described in the job
//! acquisition component design.

use crate::build::BuildsRegistry;
use crate::error::EngineError;
use crate::executor::ExecutorProvider;
use async_trait::async_trait;
use parking_lot::Mutex as PLMutex;
use runner_core::{Job, RunnerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Abstraction over `CoordinatorClient::RequestJob` so this crate doesn't
/// depend on the HTTP transport crate; `runner-network` implements this.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// `Ok(None)` is the no-job-granted ("304-equivalent") response.
    async fn request_job(
        &self,
        runner: &RunnerConfig,
        last_update: Option<&str>,
    ) -> Result<Option<(Job, Option<String>)>, EngineError>;
}

/// Called once per granted job, after it has been registered in the
/// `BuildsRegistry`, to produce and run the driver for it. Kept as a
/// callback so `RunnerSlot` doesn't need to know how loggers/traces are
/// wired together (the `cli` crate owns that).
#[async_trait]
pub trait BuildSpawner: Send + Sync {
    async fn spawn(
        &self,
        runner: RunnerConfig,
        job: Job,
        executor: Box<dyn crate::executor::Executor>,
        build_cancel: CancellationToken,
    );
}

/// Shared state for one runner identity's pool of concurrent pollers.
/// `RequestConcurrency` bounds how many `request_job` calls for this runner
/// are in flight at once, independently of `Limit` (which bounds how many
/// builds may *run* concurrently): several pollers can be waiting on the
/// coordinator at the same time even while most of them find the limit
/// already met and back off without ever calling `request_job`.
struct SlotState {
    config: RunnerConfig,
    registry: Arc<BuildsRegistry>,
    provider: Arc<dyn ExecutorProvider>,
    source: Arc<dyn JobSource>,
    spawner: Arc<dyn BuildSpawner>,
    agent_cancel: CancellationToken,
    last_update: PLMutex<Option<String>>,
    limit_logged: AtomicBool,
}

/// Runs one runner identity's pool of independent acquisition workers: poll
/// for work, hand granted jobs off without blocking, back off on errors.
pub struct RunnerSlot {
    state: Arc<SlotState>,
}

impl RunnerSlot {
    pub fn new(
        config: RunnerConfig,
        registry: Arc<BuildsRegistry>,
        provider: Arc<dyn ExecutorProvider>,
        source: Arc<dyn JobSource>,
        spawner: Arc<dyn BuildSpawner>,
        agent_cancel: CancellationToken,
    ) -> Self {
        Self {
            state: Arc::new(SlotState {
                config,
                registry,
                provider,
                source,
                spawner,
                agent_cancel,
                last_update: PLMutex::new(None),
                limit_logged: AtomicBool::new(false),
            }),
        }
    }

    /// Consumes the slot, running `request_concurrency()` concurrent poller
    /// workers until `agent_cancel` fires. Never blocks on a running build —
    /// each granted job is handed off to the spawner and the worker
    /// immediately resumes polling.
    pub async fn run(self) {
        let concurrency = self.state.config.request_concurrency();
        let mut workers = Vec::with_capacity(concurrency as usize);
        for _ in 0..concurrency {
            workers.push(tokio::spawn(poller_loop(self.state.clone())));
        }

        for worker in workers {
            match worker.await {
                Ok(()) => {}
                Err(e) if e.is_panic() => {
                    tracing::error!(runner = %self.state.config.name, "poller task panicked");
                }
                Err(e) => {
                    tracing::warn!(runner = %self.state.config.name, error = %e, "poller task failed to join");
                }
            }
        }
    }
}

async fn poller_loop(state: Arc<SlotState>) {
    loop {
        if state.agent_cancel.is_cancelled() {
            return;
        }

        if state
            .registry
            .is_build_limit_met(&state.config.name, state.config.limit)
        {
            if state
                .limit_logged
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                tracing::info!(runner = %state.config.name, "runner limit met");
            }
            if sleep_or_cancel(&state).await {
                return;
            }
            continue;
        }
        state.limit_logged.store(false, Ordering::SeqCst);

        let executor = match state.provider.acquire(&state.config).await {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(runner = %state.config.name, error = %err, "acquire failed, backing off");
                if sleep_or_cancel(&state).await {
                    return;
                }
                continue;
            }
        };

        let last_update = state.last_update.lock().clone();
        match state.source.request_job(&state.config, last_update.as_deref()).await {
            Ok(Some((job, cursor))) => {
                if let Some(cursor) = cursor {
                    *state.last_update.lock() = Some(cursor);
                }
                let job_id = job.id.clone();
                state.registry.register(&state.config.name, job_id.clone());

                let build_cancel = state.agent_cancel.child_token();
                let registry = state.registry.clone();
                let runner_name = state.config.name.clone();
                let spawner = state.spawner.clone();
                let runner_config = state.config.clone();

                let handle = tokio::spawn(async move {
                    spawner.spawn(runner_config, job, executor, build_cancel).await;
                });

                tokio::spawn(async move {
                    match handle.await {
                        Ok(()) => {}
                        Err(e) if e.is_panic() => {
                            tracing::error!(
                                runner = %runner_name,
                                job = %job_id,
                                "build task panicked; treating as system failure"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                runner = %runner_name,
                                job = %job_id,
                                error = %e,
                                "build task failed to join"
                            );
                        }
                    }
                    registry.unregister(&runner_name, &job_id);
                });
            }
            Ok(None) => {
                state.provider.release(executor).await;
            }
            Err(err) => {
                state.provider.release(executor).await;
                tracing::warn!(runner = %state.config.name, error = %err, "request_job failed, backing off");
                if sleep_or_cancel(&state).await {
                    return;
                }
            }
        }
    }
}

/// Sleeps for one poll interval, returning `true` if `agent_cancel` fired
/// first (the caller should stop looping).
async fn sleep_or_cancel(state: &Arc<SlotState>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => false,
        _ = state.agent_cancel.cancelled() => true,
    }
}

#[cfg(test)]
#[path = "runner_slot_tests.rs"]
mod tests;
