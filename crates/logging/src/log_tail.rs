// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Log-tail follower used by the `read-logs` CLI subcommand.

use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::{sleep, timeout};

#[derive(Debug, Error)]
pub enum LogTailError {
    #[error("timeout waiting for file to be created: {0}")]
    TimedOutWaitingForFile(String),
    #[error("seek offset {offset} invalid for file of length {len}")]
    InvalidOffset { offset: i64, len: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct LogTailConfig {
    pub file_wait_timeout: Duration,
    pub poll_interval: Duration,
    pub buffer_size: usize,
}

impl Default for LogTailConfig {
    fn default() -> Self {
        Self {
            file_wait_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            buffer_size: 64 * 1024,
        }
    }
}

/// Follows `path` from `start_offset`, writing `"<offset> <content>\n"` for
/// every newly observed line to `sink`. Never returns on its own short of a
/// fatal error — callers cancel it externally (e.g. by dropping the future).
pub async fn follow(
    path: &Path,
    start_offset: i64,
    config: LogTailConfig,
    mut sink: impl FnMut(u64, &[u8]),
) -> Result<(), LogTailError> {
    wait_for_file(path, config.file_wait_timeout).await?;

    let len = tokio::fs::metadata(path).await?.len();
    if start_offset < 0 || start_offset as u64 > len {
        return Err(LogTailError::InvalidOffset {
            offset: start_offset,
            len,
        });
    }

    let mut file = File::open(path).await?;
    let mut offset = start_offset as u64;
    file.seek(SeekFrom::Start(offset)).await?;

    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; config.buffer_size];

    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            if !pending.is_empty() {
                sink(offset, &pending);
                offset += pending.len() as u64;
                pending.clear();
            }
            sleep(config.poll_interval).await;
            file.seek(SeekFrom::Start(offset)).await?;
            continue;
        }
        pending.extend_from_slice(&chunk[..n]);

        loop {
            let Some(nl) = pending.iter().position(|&b| b == b'\n') else {
                break;
            };
            let line = pending[..nl].to_vec();
            let consumed = nl + 1;
            sink(offset, &line);
            offset += consumed as u64;
            pending.drain(..consumed);
        }

        if pending.len() >= config.buffer_size {
            sink(offset, &pending);
            offset += pending.len() as u64;
            pending.clear();
        }
    }
}

async fn wait_for_file(path: &Path, wait_timeout: Duration) -> Result<(), LogTailError> {
    if path.exists() {
        return Ok(());
    }
    timeout(wait_timeout, async {
        loop {
            if path.exists() {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .map_err(|_| LogTailError::TimedOutWaitingForFile(path.display().to_string()))
}

#[cfg(test)]
#[path = "log_tail_tests.rs"]
mod tests;
