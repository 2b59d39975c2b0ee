// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Wire-level HTTP transport abstraction, so the client can be exercised
//! against a fake in tests without opening real sockets.

use crate::error::NetworkError;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait CoordinatorTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError>;
}

/// Paths to the CA bundle and client certificate/key, stat'd on every
/// request so a rotated certificate is picked up without a restart.
#[derive(Debug, Clone, Default)]
pub struct TlsFiles {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

struct CachedClient {
    client: reqwest::Client,
    built_at: SystemTime,
}

/// `reqwest`-backed transport. Rebuilds its underlying `reqwest::Client`
/// whenever any TLS file's mtime is newer than the cached client's build
/// time, so certificate rotation takes effect on the next request rather
/// than requiring a process restart.
pub struct ReqwestTransport {
    tls: TlsFiles,
    insecure: bool,
    cached: Mutex<Option<CachedClient>>,
}

impl ReqwestTransport {
    pub fn new(tls: TlsFiles) -> Self {
        Self {
            tls,
            insecure: false,
            cached: Mutex::new(None),
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    fn newest_tls_mtime(&self) -> Option<SystemTime> {
        [&self.tls.ca_file, &self.tls.cert_file, &self.tls.key_file]
            .into_iter()
            .flatten()
            .filter_map(|path| std::fs::metadata(path).ok()?.modified().ok())
            .max()
    }

    fn build_client(&self) -> Result<reqwest::Client, NetworkError> {
        let mut builder = reqwest::Client::builder();
        if self.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(ca_file) = &self.tls.ca_file {
            let pem = std::fs::read(ca_file)?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| NetworkError::Tls(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }
        if let (Some(cert_file), Some(key_file)) = (&self.tls.cert_file, &self.tls.key_file) {
            let mut combined = std::fs::read(cert_file)?;
            combined.extend(std::fs::read(key_file)?);
            let identity = reqwest::Identity::from_pem(&combined)
                .map_err(|e| NetworkError::Tls(e.to_string()))?;
            builder = builder.identity(identity);
        }
        Ok(builder.build()?)
    }

    fn client(&self) -> Result<reqwest::Client, NetworkError> {
        let newest = self.newest_tls_mtime();
        let mut cached = self.cached.lock();
        let stale = match (&*cached, newest) {
            (Some(c), Some(m)) => m > c.built_at,
            (None, _) => true,
            (Some(_), None) => false,
        };
        if let (false, Some(c)) = (stale, cached.as_ref()) {
            return Ok(c.client.clone());
        }
        let client = self.build_client()?;
        *cached = Some(CachedClient {
            client: client.clone(),
            built_at: SystemTime::now(),
        });
        Ok(client)
    }
}

#[async_trait]
impl CoordinatorTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let client = self.client()?;
        let mut builder = client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, headers, body })
    }
}

/// Wraps another transport, honoring `Retry-After` on `429` responses by
/// sleeping and retrying rather than surfacing the rate limit to the caller.
pub struct RateLimitedTransport<T> {
    inner: T,
    max_retries: u32,
}

impl<T: CoordinatorTransport> RateLimitedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            max_retries: 5,
        }
    }
}

#[async_trait]
impl<T: CoordinatorTransport + Send + Sync> CoordinatorTransport for RateLimitedTransport<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let mut attempt = 0;
        loop {
            let response = self.inner.send(request.clone()).await?;
            if response.status != 429 || attempt >= self.max_retries {
                return Ok(response);
            }
            let wait = response
                .header("retry-after")
                .and_then(|v| v.parse::<u64>().ok())
                .map(std::time::Duration::from_secs)
                .unwrap_or(std::time::Duration::from_secs(1));
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
