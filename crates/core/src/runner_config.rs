// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Static configuration for a runner identity.
//!
//! Mutable only on explicit reload boundaries: the agent
//! replaces a `RunnerConfig` wholesale rather than mutating fields under a
//! live [`crate::job::Job`] execution.

use crate::id::RunnerName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which executor backend a runner is bound to. Only `Shell` ships a
/// reference driver in this crate; the other variants are
/// recognized names an `ExecutorProvider` registry entry may be keyed on,
/// so registering a container/VM backend never requires touching this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ExecutorKind {
    Shell,
    Docker,
    Kubernetes,
    VirtualBox,
    Ssh,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub name: RunnerName,
    pub url: String,
    pub token: String,
    pub executor: ExecutorKind,
    /// Maximum number of builds this runner may execute concurrently.
    pub limit: u32,
    /// Maximum number of simultaneously in-flight `RequestJob` polls,
    /// independent of `limit`.
    pub request_concurrency: u32,
    /// Poll interval used when no job is granted.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub tls_ca_file: Option<String>,
    #[serde(default)]
    pub tls_cert_file: Option<String>,
    #[serde(default)]
    pub tls_key_file: Option<String>,
    /// Opaque per-backend settings (docker image, k8s namespace, etc);
    /// the core never interprets these, only forwards them to the backend.
    #[serde(default)]
    pub backend_settings: HashMap<String, String>,
}

fn default_poll_interval_secs() -> u64 {
    3
}

impl RunnerConfig {
    pub fn request_concurrency(&self) -> u32 {
        self.request_concurrency.max(1)
    }
}

/// A file of one or more runner identities, the unit the agent reloads at
/// its explicit reload boundary. Parsing/hot-reload watching itself is an
/// external collaborator; this is just the shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnersFile {
    #[serde(default, rename = "runners")]
    pub runners: Vec<RunnerConfig>,
}
