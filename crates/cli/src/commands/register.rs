// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! `runner-agent register` — verify a registration token against the
//! coordinator and persist a new runner identity to the config file.

use clap::Args;
use runner_core::{ExecutorKind, RunnerConfig, RunnerName};
use runner_network::{CoordinatorClient, EndpointBackoff, ReqwestTransport, TlsFiles};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Coordinator base URL, e.g. https://ci.example.com
    #[arg(long)]
    pub url: String,
    /// Runner authentication token issued by the coordinator
    #[arg(long)]
    pub token: String,
    /// Local identity name for this runner (unique within the config file)
    #[arg(long)]
    pub name: String,
    #[arg(long, value_enum, default_value = "shell")]
    pub executor: ExecutorArg,
    #[arg(long, default_value_t = 1)]
    pub limit: u32,
    #[arg(long = "request-concurrency", default_value_t = 1)]
    pub request_concurrency: u32,
    #[arg(long = "tls-ca-file")]
    pub tls_ca_file: Option<String>,
    #[arg(long = "tls-cert-file")]
    pub tls_cert_file: Option<String>,
    #[arg(long = "tls-key-file")]
    pub tls_key_file: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ExecutorArg {
    Shell,
    Docker,
    Kubernetes,
    Virtualbox,
    Ssh,
    Custom,
}

impl From<ExecutorArg> for ExecutorKind {
    fn from(v: ExecutorArg) -> Self {
        match v {
            ExecutorArg::Shell => ExecutorKind::Shell,
            ExecutorArg::Docker => ExecutorKind::Docker,
            ExecutorArg::Kubernetes => ExecutorKind::Kubernetes,
            ExecutorArg::Virtualbox => ExecutorKind::VirtualBox,
            ExecutorArg::Ssh => ExecutorKind::Ssh,
            ExecutorArg::Custom => ExecutorKind::Custom,
        }
    }
}

pub async fn handle(args: RegisterArgs) -> anyhow::Result<()> {
    let config_path = crate::env::config_file(args.config.as_deref());
    let mut file = crate::config::load(&config_path)?;

    if file
        .runners
        .iter()
        .any(|r| r.name == RunnerName::new(args.name.clone()))
    {
        anyhow::bail!("a runner named '{}' is already registered", args.name);
    }

    let tls = TlsFiles {
        ca_file: args.tls_ca_file.clone().map(PathBuf::from),
        cert_file: args.tls_cert_file.clone().map(PathBuf::from),
        key_file: args.tls_key_file.clone().map(PathBuf::from),
    };
    let transport: Arc<dyn runner_network::CoordinatorTransport> =
        Arc::new(ReqwestTransport::new(tls).insecure(crate::env::insecure_tls()));
    let client = CoordinatorClient::new(transport, &args.url);
    let backoff = EndpointBackoff::new();

    let candidate = RunnerConfig {
        name: RunnerName::new(args.name.clone()),
        url: args.url.clone(),
        token: args.token.clone(),
        executor: args.executor.into(),
        limit: args.limit,
        request_concurrency: args.request_concurrency,
        poll_interval_secs: 3,
        tls_ca_file: args.tls_ca_file.clone(),
        tls_cert_file: args.tls_cert_file.clone(),
        tls_key_file: args.tls_key_file.clone(),
        backend_settings: HashMap::new(),
    };

    client
        .verify_runner(&backoff, &candidate)
        .await
        .map_err(|e| anyhow::anyhow!("coordinator rejected registration token: {e}"))?;

    file.runners.push(candidate);
    crate::config::save(&config_path, &file)?;

    println!("registered runner '{}' in {}", args.name, config_path.display());
    Ok(())
}
