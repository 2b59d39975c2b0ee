// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! `tracing-subscriber` initialization. Agent-level lines go to stderr so
//! stdout stays free for `read-logs`' formatted output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate::env::log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
