// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session configuration and its environment overrides.

use rj_core::DEFAULT_LOG_CAPACITY;
use std::time::Duration;

const DEFAULT_RECONNECT_BASE: Duration = Duration::from_millis(500);
const DEFAULT_RECONNECT_MAX: Duration = Duration::from_secs(30);
const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(15);

/// Tunables for one coordinator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub log_capacity: usize,
    pub reconnect_base: Duration,
    pub reconnect_max: Duration,
    /// Re-reconciliation period while the push channel is degraded.
    /// `None` disables periodic resync (reconnect resync still happens).
    pub resync_interval: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            reconnect_base: DEFAULT_RECONNECT_BASE,
            reconnect_max: DEFAULT_RECONNECT_MAX,
            resync_interval: Some(DEFAULT_RESYNC_INTERVAL),
        }
    }
}

impl SessionConfig {
    rj_core::setters! {
        set {
            log_capacity: usize,
            reconnect_base: Duration,
            reconnect_max: Duration,
        }
        option {
            resync_interval: Duration,
        }
    }

    pub fn without_resync(mut self) -> Self {
        self.resync_interval = None;
        self
    }

    /// Defaults overridden by `RJ_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            log_capacity: log_capacity(),
            reconnect_base: reconnect_base(),
            reconnect_max: reconnect_max(),
            resync_interval: resync_interval(),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<u64>().ok())
}

/// Per-job log capacity (default 500, `RJ_LOG_CAPACITY`). Zero is ignored.
pub fn log_capacity() -> usize {
    env_u64("RJ_LOG_CAPACITY")
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_LOG_CAPACITY)
}

/// First reconnect delay (default 500ms, `RJ_RECONNECT_BASE_MS`)
pub fn reconnect_base() -> Duration {
    env_u64("RJ_RECONNECT_BASE_MS").map(Duration::from_millis).unwrap_or(DEFAULT_RECONNECT_BASE)
}

/// Reconnect backoff ceiling (default 30s, `RJ_RECONNECT_MAX_MS`)
pub fn reconnect_max() -> Duration {
    env_u64("RJ_RECONNECT_MAX_MS").map(Duration::from_millis).unwrap_or(DEFAULT_RECONNECT_MAX)
}

/// Resync period while degraded (default 15s, `RJ_RESYNC_INTERVAL_MS`; 0 disables)
pub fn resync_interval() -> Option<Duration> {
    match env_u64("RJ_RESYNC_INTERVAL_MS") {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => Some(DEFAULT_RESYNC_INTERVAL),
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
