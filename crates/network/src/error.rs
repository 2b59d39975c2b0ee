// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Error type for the coordinator transport and client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TLS material: {0}")]
    Tls(String),
    #[error("decoding response body: {0}")]
    Decode(serde_json::Error),
    #[error("encoding request body: {0}")]
    Encode(serde_json::Error),
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
}
