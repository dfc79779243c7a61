// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::error::DaemonError;

/// Resolve the default config file path: `WARDEN_CONFIG` > `./warden.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("WARDEN_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("warden.toml"))
}

/// Resolve the runtime directory used for the default PID file location:
/// `WARDEN_RUN_DIR` > `XDG_RUNTIME_DIR` > `/tmp`.
pub fn run_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("WARDEN_RUN_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(PathBuf::from("/tmp"))
}

/// Poll interval for the config reload watcher, overridable for tests.
pub fn config_poll_interval_ms() -> Option<u64> {
    std::env::var("WARDEN_CONFIG_POLL_MS").ok().and_then(|s| s.parse().ok())
}
