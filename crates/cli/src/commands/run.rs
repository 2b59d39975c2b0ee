// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! `runner-agent run` — start the acquisition loop for every configured
//! runner identity and block until an interrupt signal.

use crate::spawner::AgentBuildSpawner;
use clap::Args;
use runner_engine::{BuildsRegistry, RunnerSlot, ShellExecutorProvider};
use runner_network::{
    CoordinatorClient, CoordinatorJobSource, EndpointBackoff, RateLimitedTransport,
    ReqwestTransport, TlsFiles,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the runners config file (defaults to RUNNER_CONFIG_FILE or
    /// ~/.config/runner-agent/config.toml)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

pub async fn handle(args: RunArgs) -> anyhow::Result<()> {
    let config_path = crate::env::config_file(args.config.as_deref());
    let runners_file = crate::config::load(&config_path)?;
    if runners_file.runners.is_empty() {
        anyhow::bail!(
            "no runners configured in {} — run `register` first",
            config_path.display()
        );
    }

    let registry = Arc::new(BuildsRegistry::new());
    let builds_dir = crate::env::builds_dir();
    let agent_cancel = CancellationToken::new();
    let insecure = crate::env::insecure_tls();

    {
        let agent_cancel = agent_cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received interrupt, shutting down");
                agent_cancel.cancel();
            }
        });
    }

    let mut handles = Vec::new();
    for runner in runners_file.runners {
        tracing::info!(runner = %runner.name, "starting acquisition loop");

        let tls = TlsFiles {
            ca_file: runner.tls_ca_file.clone().map(PathBuf::from),
            cert_file: runner.tls_cert_file.clone().map(PathBuf::from),
            key_file: runner.tls_key_file.clone().map(PathBuf::from),
        };
        let transport = RateLimitedTransport::new(ReqwestTransport::new(tls).insecure(insecure));
        let transport: Arc<dyn runner_network::CoordinatorTransport> = Arc::new(transport);
        let client = CoordinatorClient::new(transport, &runner.url);
        let backoff = Arc::new(EndpointBackoff::new());

        let source = Arc::new(CoordinatorJobSource::new(client.clone(), backoff.clone()));
        let provider = Arc::new(ShellExecutorProvider {
            builds_dir: builds_dir.clone(),
        });
        let spawner = Arc::new(AgentBuildSpawner {
            client,
            backoff,
            agent_cancel: agent_cancel.clone(),
        });

        let runner_name = runner.name.clone();
        let slot = RunnerSlot::new(
            runner,
            registry.clone(),
            provider,
            source,
            spawner,
            agent_cancel.clone(),
        );
        handles.push((runner_name, tokio::spawn(slot.run())));
    }

    for (runner_name, handle) in handles {
        match handle.await {
            Ok(()) => {}
            Err(e) if e.is_panic() => {
                tracing::error!(runner = %runner_name, "acquisition loop panicked");
            }
            Err(e) => {
                tracing::warn!(runner = %runner_name, error = %e, "acquisition loop failed to join");
            }
        }
    }

    Ok(())
}
