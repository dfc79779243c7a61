// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type unifying the daemon crate's sub-errors.

use std::path::PathBuf;

use thiserror::Error;
use warden_core::ConfigError;

/// Errors that can terminate the daemon or a reload attempt (§7).
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to acquire PID file lock at {0}: daemon already running?")]
    PidLockFailed(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to drop privileges: {0}")]
    Privilege(String),

    #[error("server process exited during startup before becoming ready")]
    ServerStartupFailed,

    #[error("worker monitor {0:?} observed an invariant violation: {1}")]
    MonitorInvariant(warden_core::WorkerId, String),
}
