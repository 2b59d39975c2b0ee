use super::*;
use crate::executor::{Executor, StepOutcome};
use async_trait::async_trait;
use runner_core::{GitInfo, JobId, Step};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

fn job(steps: Vec<Step>) -> Job {
    Job {
        id: JobId::new("job-1"),
        token: "tok".to_string(),
        steps,
        variables: HashMap::new(),
        masked_variables: Vec::new(),
        git: GitInfo {
            sha: "abc".to_string(),
            before_sha: "000".to_string(),
            r#ref: "main".to_string(),
            repo_url: "https://example.invalid/repo.git".to_string(),
        },
        artifacts: Vec::new(),
        caches: Vec::new(),
        services: Vec::new(),
    }
}

fn step(name: &str, when: WhenPolicy, allow_failure: bool) -> Step {
    Step {
        name: name.to_string(),
        script: vec!["true".to_string()],
        timeout: Duration::from_secs(30),
        when,
        allow_failure,
    }
}

struct ScriptedExecutor {
    outcomes: HashMap<String, StepOutcome>,
    prepare_fails: bool,
    ran_steps: Arc<StdMutex<Vec<String>>>,
    cleanup_called: Arc<AtomicBool>,
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn prepare(&mut self) -> Result<(), StageError> {
        if self.prepare_fails {
            Err(StageError::System("backend unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn run_step(
        &mut self,
        step: &Step,
        _logger: &BuildLogger,
        _cancel: CancellationToken,
    ) -> StepOutcome {
        self.ran_steps.lock().expect("lock").push(step.name.clone());
        self.outcomes
            .get(&step.name)
            .cloned()
            .unwrap_or(StepOutcome::Success)
    }

    async fn cleanup(&mut self) -> Result<(), StageError> {
        self.cleanup_called.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn driver(j: Job, executor: ScriptedExecutor) -> (BuildDriver, Arc<JobTrace>) {
    let trace = Arc::new(JobTrace::new(false));
    let logger = BuildLogger::new(Some(trace.clone()), tracing::Span::none());
    let build = Build::new("proj".to_string(), CancellationToken::new());
    let agent_cancel = CancellationToken::new();
    let d = BuildDriver::new(build, j, Box::new(executor), trace.clone(), logger, agent_cancel);
    (d, trace)
}

#[tokio::test]
async fn successful_build_runs_only_on_success_steps() {
    let steps = vec![
        step("build", WhenPolicy::OnSuccess, false),
        step("cleanup_on_fail", WhenPolicy::OnFailure, false),
        step("always", WhenPolicy::Always, false),
    ];
    let ran = Arc::new(StdMutex::new(Vec::new()));
    let executor = ScriptedExecutor {
        outcomes: HashMap::new(),
        prepare_fails: false,
        ran_steps: ran.clone(),
        cleanup_called: Arc::new(AtomicBool::new(false)),
    };
    let (d, trace) = driver(job(steps), executor);
    let outcome = d.run().await;
    assert!(matches!(outcome, BuildOutcome::Success));
    assert_eq!(*ran.lock().expect("lock"), vec!["build", "always"]);
    assert!(matches!(trace.outcome(), Some(TraceOutcome::Success)));
}

#[tokio::test]
async fn allow_failure_step_does_not_fail_the_build() {
    let steps = vec![step("flaky", WhenPolicy::OnSuccess, true)];
    let mut outcomes = HashMap::new();
    outcomes.insert(
        "flaky".to_string(),
        StepOutcome::Failed(StageError::Build("boom".to_string())),
    );
    let executor = ScriptedExecutor {
        outcomes,
        prepare_fails: false,
        ran_steps: Arc::new(StdMutex::new(Vec::new())),
        cleanup_called: Arc::new(AtomicBool::new(false)),
    };
    let (d, _trace) = driver(job(steps), executor);
    let outcome = d.run().await;
    assert!(matches!(outcome, BuildOutcome::Success));
}

#[tokio::test]
async fn failed_step_runs_on_failure_steps_and_skips_remaining_on_success_steps() {
    let steps = vec![
        step("build", WhenPolicy::OnSuccess, false),
        step("more_build", WhenPolicy::OnSuccess, false),
        step("report_failure", WhenPolicy::OnFailure, false),
    ];
    let mut outcomes = HashMap::new();
    outcomes.insert(
        "build".to_string(),
        StepOutcome::Failed(StageError::Build("bad code".to_string())),
    );
    let ran = Arc::new(StdMutex::new(Vec::new()));
    let executor = ScriptedExecutor {
        outcomes,
        prepare_fails: false,
        ran_steps: ran.clone(),
        cleanup_called: Arc::new(AtomicBool::new(false)),
    };
    let (d, trace) = driver(job(steps), executor);
    let outcome = d.run().await;
    assert!(matches!(outcome, BuildOutcome::Failed(StageError::Build(_))));
    assert_eq!(*ran.lock().expect("lock"), vec!["build", "report_failure"]);
    match trace.outcome() {
        Some(TraceOutcome::Failed { kind, .. }) => {
            assert_eq!(kind, runner_core::FailureKind::ScriptFailure)
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn cleanup_runs_even_when_prepare_executor_fails() {
    let cleanup_called = Arc::new(AtomicBool::new(false));
    let executor = ScriptedExecutor {
        outcomes: HashMap::new(),
        prepare_fails: true,
        ran_steps: Arc::new(StdMutex::new(Vec::new())),
        cleanup_called: cleanup_called.clone(),
    };
    let (d, _trace) = driver(job(vec![step("build", WhenPolicy::OnSuccess, false)]), executor);
    let outcome = d.run().await;
    assert!(matches!(outcome, BuildOutcome::Failed(StageError::System(_))));
    assert!(cleanup_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn coordinator_cancel_reports_canceled_not_aborted() {
    let mut outcomes = HashMap::new();
    outcomes.insert("build".to_string(), StepOutcome::Canceled);
    let executor = ScriptedExecutor {
        outcomes,
        prepare_fails: false,
        ran_steps: Arc::new(StdMutex::new(Vec::new())),
        cleanup_called: Arc::new(AtomicBool::new(false)),
    };
    let (d, _trace) = driver(job(vec![step("build", WhenPolicy::OnSuccess, false)]), executor);
    let outcome = d.run().await;
    match outcome {
        BuildOutcome::Failed(StageError::Build(msg)) => assert_eq!(msg, "canceled"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[yare::parameterized(
    on_success_when_passing = { WhenPolicy::OnSuccess, false, true },
    on_success_when_failing = { WhenPolicy::OnSuccess, true, false },
    on_failure_when_passing = { WhenPolicy::OnFailure, false, false },
    on_failure_when_failing = { WhenPolicy::OnFailure, true, true },
    always_when_passing = { WhenPolicy::Always, false, true },
    always_when_failing = { WhenPolicy::Always, true, true },
    manual_when_passing = { WhenPolicy::Manual, false, false },
    manual_when_failing = { WhenPolicy::Manual, true, false },
)]
fn step_eligibility_matches_when_policy(when: WhenPolicy, build_failed: bool, expected: bool) {
    assert_eq!(step_is_eligible(when, build_failed), expected);
}

