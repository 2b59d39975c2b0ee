// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! runner-agent: CLI entry point for the distributed CI job-runner agent.

mod commands;
mod config;
mod env;
mod logging;
mod spawner;

use clap::{Parser, Subcommand};
use commands::{read_logs, register, run, unregister};

#[derive(Parser)]
#[command(name = "runner-agent", version, about = "Distributed CI job-runner agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent with its configured runners
    Run(run::RunArgs),
    /// Enroll a new runner identity with the coordinator
    Register(register::RegisterArgs),
    /// Remove a runner identity
    Unregister(unregister::UnregisterArgs),
    /// Follow a build log file from an offset
    ReadLogs(read_logs::ReadLogsArgs),
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run::handle(args).await,
        Commands::Register(args) => register::handle(args).await,
        Commands::Unregister(args) => unregister::handle(args),
        Commands::ReadLogs(args) => read_logs::handle(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
