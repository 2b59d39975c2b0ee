use super::*;
use crate::executor::{Executor, StepOutcome};
use runner_core::{GitInfo, JobId, RunnerName, Step};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

struct DummyExecutor;

#[async_trait]
impl Executor for DummyExecutor {
    async fn prepare(&mut self) -> Result<(), StageError> {
        Ok(())
    }
    async fn run_step(
        &mut self,
        _step: &Step,
        _logger: &BuildLogger,
        _cancel: CancellationToken,
    ) -> StepOutcome {
        StepOutcome::Success
    }
    async fn cleanup(&mut self) -> Result<(), StageError> {
        Ok(())
    }
}

use crate::error::StageError;
use runner_logging::BuildLogger;

struct CountingProvider {
    acquire_calls: Arc<AtomicUsize>,
    release_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ExecutorProvider for CountingProvider {
    async fn acquire(&self, _runner: &RunnerConfig) -> Result<Box<dyn Executor>, EngineError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(DummyExecutor))
    }
    async fn release(&self, _executor: Box<dyn Executor>) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct OneShotThenEmptySource {
    served: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl JobSource for OneShotThenEmptySource {
    async fn request_job(
        &self,
        _runner: &RunnerConfig,
        _last_update: Option<&str>,
    ) -> Result<Option<(Job, Option<String>)>, EngineError> {
        if self.served.swap(true, Ordering::SeqCst) {
            Ok(None)
        } else {
            let j = Job {
                id: JobId::new("job-1"),
                token: "tok".to_string(),
                steps: Vec::new(),
                variables: HashMap::new(),
                masked_variables: Vec::new(),
                git: GitInfo {
                    sha: "a".to_string(),
                    before_sha: "0".to_string(),
                    r#ref: "main".to_string(),
                    repo_url: "https://example.invalid".to_string(),
                },
                artifacts: Vec::new(),
                caches: Vec::new(),
                services: Vec::new(),
            };
            Ok(Some((j, Some("cursor-1".to_string()))))
        }
    }
}

struct AlwaysEmptySource;

#[async_trait]
impl JobSource for AlwaysEmptySource {
    async fn request_job(
        &self,
        _runner: &RunnerConfig,
        _last_update: Option<&str>,
    ) -> Result<Option<(Job, Option<String>)>, EngineError> {
        Ok(None)
    }
}

struct AlwaysFailingProvider;

#[async_trait]
impl ExecutorProvider for AlwaysFailingProvider {
    async fn acquire(&self, _runner: &RunnerConfig) -> Result<Box<dyn Executor>, EngineError> {
        Err(EngineError::Acquire("backend saturated".to_string()))
    }
    async fn release(&self, _executor: Box<dyn Executor>) {}
}

struct RecordingSpawner {
    notify: Arc<Notify>,
}

#[async_trait]
impl BuildSpawner for RecordingSpawner {
    async fn spawn(
        &self,
        _runner: RunnerConfig,
        _job: Job,
        _executor: Box<dyn Executor>,
        _build_cancel: CancellationToken,
    ) {
        self.notify.notify_one();
    }
}

fn config(limit: u32) -> RunnerConfig {
    RunnerConfig {
        name: RunnerName::new("r1"),
        url: "https://example.invalid".to_string(),
        token: "tok".to_string(),
        executor: runner_core::ExecutorKind::Shell,
        limit,
        request_concurrency: 1,
        poll_interval_secs: 0,
        tls_ca_file: None,
        tls_cert_file: None,
        tls_key_file: None,
        backend_settings: HashMap::new(),
    }
}

#[tokio::test]
async fn limit_already_met_never_acquires() {
    let registry = Arc::new(BuildsRegistry::new());
    registry.register(&RunnerName::new("r1"), JobId::new("existing"));

    let acquire_calls = Arc::new(AtomicUsize::new(0));
    let provider = Arc::new(CountingProvider {
        acquire_calls: acquire_calls.clone(),
        release_calls: Arc::new(AtomicUsize::new(0)),
    });
    let agent_cancel = CancellationToken::new();
    let slot = RunnerSlot::new(
        config(1),
        registry,
        provider,
        Arc::new(AlwaysEmptySource),
        Arc::new(RecordingSpawner {
            notify: Arc::new(Notify::new()),
        }),
        agent_cancel.clone(),
    );

    let handle = tokio::spawn(slot.run());
    tokio::time::sleep(Duration::from_millis(30)).await;
    agent_cancel.cancel();
    handle.await.expect("slot task");

    assert_eq!(acquire_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn granted_job_is_registered_then_spawned_then_unregistered() {
    let registry = Arc::new(BuildsRegistry::new());
    let provider = Arc::new(CountingProvider {
        acquire_calls: Arc::new(AtomicUsize::new(0)),
        release_calls: Arc::new(AtomicUsize::new(0)),
    });
    let notify = Arc::new(Notify::new());
    let spawner = Arc::new(RecordingSpawner {
        notify: notify.clone(),
    });
    let agent_cancel = CancellationToken::new();
    let slot = RunnerSlot::new(
        config(1),
        registry.clone(),
        provider,
        Arc::new(OneShotThenEmptySource {
            served: std::sync::atomic::AtomicBool::new(false),
        }),
        spawner,
        agent_cancel.clone(),
    );

    let handle = tokio::spawn(slot.run());
    notify.notified().await;
    // The spawner callback runs inline inside the spawned hand-off task
    // before `unregister`, so give that task a moment to finish.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(registry.active_count(&RunnerName::new("r1")), 0);

    agent_cancel.cancel();
    handle.await.expect("slot task");
}

#[tokio::test]
async fn no_job_granted_releases_the_executor() {
    let registry = Arc::new(BuildsRegistry::new());
    let release_calls = Arc::new(AtomicUsize::new(0));
    let provider = Arc::new(CountingProvider {
        acquire_calls: Arc::new(AtomicUsize::new(0)),
        release_calls: release_calls.clone(),
    });
    let agent_cancel = CancellationToken::new();
    let slot = RunnerSlot::new(
        config(1),
        registry,
        provider,
        Arc::new(AlwaysEmptySource),
        Arc::new(RecordingSpawner {
            notify: Arc::new(Notify::new()),
        }),
        agent_cancel.clone(),
    );

    let handle = tokio::spawn(slot.run());
    tokio::time::sleep(Duration::from_millis(30)).await;
    agent_cancel.cancel();
    handle.await.expect("slot task");

    assert!(release_calls.load(Ordering::SeqCst) > 0);
}

#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<std::sync::Mutex<Vec<u8>>>,
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn runner_limit_met_log_fires_exactly_once_across_concurrent_pollers() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let registry = Arc::new(BuildsRegistry::new());
    let runner_name = RunnerName::new("r1");
    // Two builds already running against a Limit of 2: every poller in the
    // pool below observes the limit met from its very first iteration.
    registry.register(&runner_name, JobId::new("existing-1"));
    registry.register(&runner_name, JobId::new("existing-2"));

    let acquire_calls = Arc::new(AtomicUsize::new(0));
    let provider = Arc::new(CountingProvider {
        acquire_calls: acquire_calls.clone(),
        release_calls: Arc::new(AtomicUsize::new(0)),
    });
    let agent_cancel = CancellationToken::new();
    let mut cfg = config(2);
    cfg.request_concurrency = 3; // Limit + 1 would-be builds.
    let slot = RunnerSlot::new(
        cfg,
        registry,
        provider,
        Arc::new(AlwaysEmptySource),
        Arc::new(RecordingSpawner {
            notify: Arc::new(Notify::new()),
        }),
        agent_cancel.clone(),
    );

    let handle = tokio::spawn(slot.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    agent_cancel.cancel();
    handle.await.expect("slot task");

    assert_eq!(acquire_calls.load(Ordering::SeqCst), 0);

    let captured = String::from_utf8_lossy(&logs.logs.lock().expect("lock")).to_string();
    let occurrences = captured.matches("runner limit met").count();
    assert_eq!(occurrences, 1, "expected exactly one log line, got:\n{captured}");
}

#[tokio::test]
async fn acquire_failure_does_not_panic_the_loop() {
    let registry = Arc::new(BuildsRegistry::new());
    let agent_cancel = CancellationToken::new();
    let slot = RunnerSlot::new(
        config(1),
        registry,
        Arc::new(AlwaysFailingProvider),
        Arc::new(AlwaysEmptySource),
        Arc::new(RecordingSpawner {
            notify: Arc::new(Notify::new()),
        }),
        agent_cancel.clone(),
    );

    let handle = tokio::spawn(slot.run());
    tokio::time::sleep(Duration::from_millis(20)).await;
    agent_cancel.cancel();
    handle.await.expect("slot task");
}
