// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! `runner-agent read-logs` — stream a build log file from an offset,
//! printing `<offset> <content>` lines to stdout as they're written.

use clap::Args;
use runner_logging::{follow, LogTailConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReadLogsArgs {
    #[arg(long)]
    pub path: PathBuf,
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
}

pub async fn handle(args: ReadLogsArgs) -> anyhow::Result<()> {
    let result = follow(&args.path, args.offset, LogTailConfig::default(), |offset, line| {
        let text = String::from_utf8_lossy(line);
        println!("{offset} {text}");
    })
    .await;

    if let Err(e) = result {
        anyhow::bail!("error reading logs: {e}");
    }
    Ok(())
}
