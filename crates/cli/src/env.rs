// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Centralized environment variable access for the agent binary.

use std::path::PathBuf;

/// Resolve the runners config file: `RUNNER_CONFIG_FILE` env var, or
/// `~/.config/runner-agent/config.toml`.
pub fn config_file(explicit: Option<&std::path::Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Ok(p) = std::env::var("RUNNER_CONFIG_FILE") {
        return PathBuf::from(p);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/runner-agent/config.toml")
}

/// Builds directory each job's workdir is created under:
/// `RUNNER_BUILDS_DIR`, or `~/.local/state/runner-agent/builds`.
pub fn builds_dir() -> PathBuf {
    if let Ok(p) = std::env::var("RUNNER_BUILDS_DIR") {
        return PathBuf::from(p);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/state/runner-agent/builds")
}

pub fn log_filter() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

pub fn insecure_tls() -> bool {
    std::env::var("RUNNER_INSECURE_TLS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
