// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! `runner-agent unregister` — drop a runner identity from the config file.
//!
//! The coordinator API surface consumed elsewhere in this agent has no
//! runner-deletion endpoint, so this only removes the local identity; any
//! coordinator-side cleanup is operator-driven.

use clap::Args;
use runner_core::RunnerName;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct UnregisterArgs {
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Local identity name to remove
    #[arg(long)]
    pub name: String,
}

pub fn handle(args: UnregisterArgs) -> anyhow::Result<()> {
    let config_path = crate::env::config_file(args.config.as_deref());
    let mut file = crate::config::load(&config_path)?;

    let target = RunnerName::new(args.name.clone());
    let before = file.runners.len();
    file.runners.retain(|r| r.name != target);
    if file.runners.len() == before {
        anyhow::bail!("no runner named '{}' in {}", args.name, config_path.display());
    }

    crate::config::save(&config_path, &file)?;
    println!("unregistered runner '{}'", args.name);
    Ok(())
}
