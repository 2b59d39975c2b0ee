// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Per-endpoint exponential backoff, keyed by `(method, request-uri)`.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use parking_lot::Mutex;
use reqwest::Method;
use std::collections::HashMap;
use std::time::Duration;

const MIN_INTERVAL: Duration = Duration::from_millis(100);
const MAX_INTERVAL: Duration = Duration::from_secs(60);
const MULTIPLIER: f64 = 2.0;

pub type EndpointKey = (Method, String);

/// Single mutex guarding the map; every lookup is O(1).
pub struct EndpointBackoff {
    entries: Mutex<HashMap<EndpointKey, ExponentialBackoff>>,
}

impl EndpointBackoff {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn fresh() -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: MIN_INTERVAL,
            initial_interval: MIN_INTERVAL,
            multiplier: MULTIPLIER,
            randomization_factor: 1.0,
            max_interval: MAX_INTERVAL,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Delay to sleep before returning control to the caller after a 5xx;
    /// advances this endpoint's interval toward `MAX_INTERVAL` for next time.
    pub fn next_delay(&self, key: &EndpointKey) -> Duration {
        let mut entries = self.entries.lock();
        let backoff = entries.entry(key.clone()).or_insert_with(Self::fresh);
        backoff.next_backoff().unwrap_or(MAX_INTERVAL)
    }

    /// A success resets the endpoint's entry back to its initial interval.
    pub fn reset(&self, key: &EndpointKey) {
        let mut entries = self.entries.lock();
        if let Some(backoff) = entries.get_mut(key) {
            backoff.reset();
        }
    }
}

impl Default for EndpointBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "endpoint_backoff_tests.rs"]
mod tests;
