// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! The build driver: walks a Build through the fixed stage sequence.

use crate::build::Build;
use crate::error::StageError;
use crate::executor::{Executor, StepOutcome};
use crate::stage::Stage;
use runner_core::{FeatureFlags, Flag, Job, WhenPolicy};
use runner_logging::{BuildLogger, JobTrace};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum BuildOutcome {
    Success,
    Failed(StageError),
}

/// Drives one [`Build`] through `resolve-secrets → ... → cleanup-executor`.
/// Cleanup stages always run once `prepare-executor` has been entered,
/// satisfying the guarantee that every Build reaching Prepare either
/// reaches Cleanup or the agent crashes.
pub struct BuildDriver {
    build: Build,
    job: Job,
    executor: Box<dyn Executor>,
    trace: Arc<JobTrace>,
    logger: BuildLogger,
    /// This build's node in the cancellation tree — canceled directly by a
    /// coordinator `patchTrace` cancel response.
    build_cancel: CancellationToken,
    /// An ancestor node, canceled only by agent-wide shutdown (OS
    /// interrupt). Distinguishes *abort* from *cancel* when `build_cancel`
    /// fires: if the ancestor is also canceled, shutdown caused it.
    agent_cancel: CancellationToken,
    feature_flags: FeatureFlags,
}

impl BuildDriver {
    pub fn new(
        build: Build,
        job: Job,
        executor: Box<dyn Executor>,
        trace: Arc<JobTrace>,
        logger: BuildLogger,
        agent_cancel: CancellationToken,
    ) -> Self {
        let build_cancel = build.cancel.clone();
        let cancel_for_trace = build_cancel.clone();
        trace.set_cancel_fn(move || cancel_for_trace.cancel());
        let feature_flags = FeatureFlags::resolve(&job.variables);
        Self {
            build,
            job,
            executor,
            trace,
            logger,
            build_cancel,
            agent_cancel,
            feature_flags,
        }
    }

    fn cancellation_message(&self) -> &'static str {
        if self.agent_cancel.is_cancelled() {
            "aborted: interrupt"
        } else {
            "canceled"
        }
    }

    fn resolve_secrets(&self) {
        let masked: Vec<String> = self
            .job
            .masked_variables
            .iter()
            .filter_map(|name| self.job.variables.get(name).cloned())
            .filter(|v| !v.is_empty())
            .collect();
        self.trace.set_masked(masked);
    }

    pub async fn run(mut self) -> BuildOutcome {
        self.build.set_current_stage(Stage::ResolveSecrets);
        self.resolve_secrets();

        self.build.set_current_stage(Stage::PrepareExecutor);
        let mut failure: Option<StageError> = match self.executor.prepare().await {
            Ok(()) => None,
            Err(e) => Some(e),
        };

        if failure.is_none() {
            failure = self.run_prepare_through_steps().await;
        }

        if failure.is_none() {
            failure = self.run_post_step_stages().await;
        }

        self.build.set_current_stage(Stage::CleanupFileVariables);
        // Nothing allocates file-backed variables in this implementation;
        // this stage exists for executors that do.

        self.build.set_current_stage(Stage::CleanupExecutor);
        if let Err(e) = self.executor.cleanup().await {
            tracing::warn!(error = %e, "cleanup-executor failed");
        }

        match failure {
            None => {
                self.trace.success();
                BuildOutcome::Success
            }
            Some(e) => {
                self.trace.fail(e.to_string(), e.failure_kind());
                BuildOutcome::Failed(e)
            }
        }
    }

    async fn run_prepare_through_steps(&mut self) -> Option<StageError> {
        self.build.set_current_stage(Stage::PrepareScript);

        self.build.set_current_stage(Stage::GetSources);
        self.logger
            .infoln(&format!("Fetching changes for {}...", self.job.git.r#ref));

        let skip_noop = self.feature_flags.is_on(Flag::SkipNoopBuildStages);

        self.build.set_current_stage(Stage::RestoreCache);
        if self.job.caches.is_empty() {
            if skip_noop {
                tracing::debug!("no cache directives, skipping restore-cache");
            } else {
                self.logger.infoln("Restoring cache");
            }
        } else {
            for cache in &self.job.caches {
                self.logger.infoln(&format!("Restoring cache: {}", cache.key));
            }
        }

        self.build.set_current_stage(Stage::DownloadArtifacts);
        if self.job.artifacts.is_empty() {
            if skip_noop {
                tracing::debug!("no artifact directives, skipping download-artifacts");
            } else {
                self.logger.infoln("Downloading artifacts");
            }
        } else {
            for artifact in &self.job.artifacts {
                self.logger
                    .infoln(&format!("Downloading artifact: {}", artifact.name));
            }
        }

        self.build.set_current_stage(Stage::UserStepScript);
        self.run_steps(|w| matches!(w, WhenPolicy::OnSuccess | WhenPolicy::OnFailure))
            .await
    }

    async fn run_post_step_stages(&mut self) -> Option<StageError> {
        let skip_noop = self.feature_flags.is_on(Flag::SkipNoopBuildStages);

        self.build.set_current_stage(Stage::ArchiveCache);
        if self.job.caches.is_empty() {
            if !skip_noop {
                self.logger.infoln("Archiving cache");
            }
        } else {
            for cache in &self.job.caches {
                self.logger.infoln(&format!("Archiving cache: {}", cache.key));
            }
        }

        self.build.set_current_stage(Stage::UploadArtifacts);
        if self.job.artifacts.is_empty() {
            if !skip_noop {
                self.logger.infoln("Uploading artifacts");
            }
        } else {
            for artifact in &self.job.artifacts {
                self.logger
                    .infoln(&format!("Uploading artifact: {}", artifact.name));
            }
        }

        self.build.set_current_stage(Stage::AfterScript);
        self.run_steps(|w| matches!(w, WhenPolicy::Always)).await
    }

    /// Runs every step whose `when` policy matches `selects`, in job order,
    /// re-evaluating `OnSuccess`/`OnFailure` eligibility against the build's
    /// failure state as it evolves mid-loop.
    async fn run_steps(&mut self, selects: impl Fn(WhenPolicy) -> bool) -> Option<StageError> {
        let mut build_failed = false;
        let mut failure = None;
        let steps = self.job.steps.clone();

        for step in &steps {
            if !selects(step.when) {
                continue;
            }
            if !step_is_eligible(step.when, build_failed) {
                continue;
            }

            let child_cancel = self.build_cancel.child_token();
            match self.executor.run_step(step, &self.logger, child_cancel).await {
                StepOutcome::Success => {}
                StepOutcome::Failed(e) => {
                    if step.allow_failure {
                        self.logger
                            .soft_errorln(&format!("step {} failed (allowed): {}", step.name, e));
                    } else {
                        self.logger.errorln(&format!("step {} failed: {}", step.name, e));
                        build_failed = true;
                        failure.get_or_insert(e);
                    }
                }
                StepOutcome::Canceled => {
                    let message = self.cancellation_message();
                    self.logger.errorln(message);
                    build_failed = true;
                    failure.get_or_insert(StageError::Build(message.to_string()));
                    break;
                }
            }
        }

        failure
    }
}

/// Whether a step with the given `when` policy runs given the build's
/// current failure state.
fn step_is_eligible(when: WhenPolicy, build_failed: bool) -> bool {
    match when {
        WhenPolicy::OnSuccess => !build_failed,
        WhenPolicy::OnFailure => build_failed,
        WhenPolicy::Always => true,
        WhenPolicy::Manual => false,
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
