// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! runner-network: the coordinator HTTP/JSON client — URL normalization,
//! TLS refresh, per-endpoint backoff, rate-limit handling, and the
//! last-update polling cursor.

pub mod client;
pub mod endpoint_backoff;
pub mod error;
pub mod transport;
pub mod url_fix;
mod wire;

pub use client::{CoordinatorClient, CoordinatorJobSource};
pub use endpoint_backoff::EndpointBackoff;
pub use error::NetworkError;
pub use transport::{CoordinatorTransport, HttpRequest, HttpResponse, RateLimitedTransport, ReqwestTransport, TlsFiles};
pub use url_fix::fix_ci_url;
