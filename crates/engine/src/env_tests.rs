// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

// Environment is process-global, so all env-reading cases run in one test.
#[test]
fn from_env_reads_overrides_and_ignores_garbage() {
    std::env::set_var("RJ_LOG_CAPACITY", "50");
    std::env::set_var("RJ_RECONNECT_BASE_MS", "250");
    std::env::set_var("RJ_RECONNECT_MAX_MS", "not-a-number");
    std::env::set_var("RJ_RESYNC_INTERVAL_MS", "0");

    let config = SessionConfig::from_env();
    assert_eq!(config.log_capacity, 50);
    assert_eq!(config.reconnect_base, Duration::from_millis(250));
    assert_eq!(config.reconnect_max, DEFAULT_RECONNECT_MAX);
    assert_eq!(config.resync_interval, None);

    std::env::set_var("RJ_LOG_CAPACITY", "0");
    std::env::set_var("RJ_RESYNC_INTERVAL_MS", " 2000 ");
    assert_eq!(log_capacity(), DEFAULT_LOG_CAPACITY);
    assert_eq!(resync_interval(), Some(Duration::from_secs(2)));

    for name in
        ["RJ_LOG_CAPACITY", "RJ_RECONNECT_BASE_MS", "RJ_RECONNECT_MAX_MS", "RJ_RESYNC_INTERVAL_MS"]
    {
        std::env::remove_var(name);
    }
    assert_eq!(SessionConfig::from_env(), SessionConfig::default());
}

#[test]
fn setters_override_defaults() {
    let config = SessionConfig::default()
        .log_capacity(10)
        .reconnect_base(Duration::from_millis(10))
        .reconnect_max(Duration::from_millis(80))
        .resync_interval(Duration::from_secs(1));
    assert_eq!(config.log_capacity, 10);
    assert_eq!(config.reconnect_max, Duration::from_millis(80));
    assert_eq!(config.resync_interval, Some(Duration::from_secs(1)));
    assert_eq!(config.without_resync().resync_interval, None);
}
