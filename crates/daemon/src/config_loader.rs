// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default [`ConfigLoader`] (C9): reads a TOML file, rejects unknown keys,
//! then applies a narrow set of environment-variable overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use warden_core::{Config, ConfigError, ConfigLoader};

/// Reads `path` as TOML on every `load()` call (so a reload re-reads the
/// file from disk), then validates the closed option set.
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    path: PathBuf,
}

impl TomlConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Known top-level keys, used to reject unrecognized ones (§4.9: "unknown
/// keys are rejected at startup"). Kept in lockstep with [`Config`]'s fields.
const KNOWN_KEYS: &[&str] = &[
    "daemonize", "pid_path", "supervisor", "daemon_process_name", "chuser", "chgroup", "chumask",
    "daemonize_error_exit_code", "server_process_name", "restart_server_process", "enable_detach",
    "exit_on_detach", "disable_reload", "server_restart_wait", "server_detach_wait", "worker_type",
    "workers", "start_worker_delay", "start_worker_delay_rand", "worker_process_name",
    "worker_heartbeat_interval", "worker_heartbeat_timeout", "worker_graceful_kill_interval",
    "worker_graceful_kill_interval_increment", "worker_graceful_kill_timeout",
    "worker_immediate_kill_interval", "worker_immediate_kill_interval_increment",
    "worker_immediate_kill_timeout", "log", "log_level", "log_rotate_age", "log_rotate_size",
    "log_stdout", "log_stderr",
];

fn reject_unknown_keys(raw: &str) -> Result<(), ConfigError> {
    let table: toml::Value = raw.parse().map_err(|e: toml::de::Error| ConfigError::Source(e.to_string()))?;
    let Some(table) = table.as_table() else { return Ok(()) };
    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::UnknownKey(key.clone()));
        }
    }
    Ok(())
}

impl ConfigLoader for TomlConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::Source(format!("{}: {e}", self.path.display())))?;
        reject_unknown_keys(&raw)?;
        let mut config: Config = toml::from_str(&raw).map_err(|e| ConfigError::Source(e.to_string()))?;
        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// A small set of env-var overrides applied after the file is parsed, so
/// operators can tweak a single value (e.g. in a container) without
/// rewriting the whole file. Recognized prefix: `WARDEN_CFG_<KEY>`.
fn apply_env_overrides(config: &mut Config) {
    let overrides: HashMap<String, String> = std::env::vars()
        .filter_map(|(k, v)| k.strip_prefix("WARDEN_CFG_").map(|k| (k.to_ascii_lowercase(), v)))
        .collect();

    if let Some(v) = overrides.get("workers").and_then(|v| v.parse().ok()) {
        config.workers = v;
    }
    if let Some(v) = overrides.get("log_level") {
        if let Some(level) = warden_core::LogLevel::from_str_loose(v) {
            config.log_level = level;
        }
    }
    if let Some(v) = overrides.get("worker_type") {
        if let Some(wt) = warden_core::WorkerType::from_str_loose(v) {
            config.worker_type = wt;
        }
    }
    if let Some(v) = overrides.get("disable_reload").and_then(|v| v.parse().ok()) {
        config.disable_reload = v;
    }
}

/// A `ConfigLoader` that always returns the same in-memory snapshot.
/// Substituted in tests and by `--no-config` style invocations.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader(pub Config);

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

/// Read a PID previously written by [`crate::process_env::write_pid_file`].
pub fn read_pid_file(path: &Path) -> std::io::Result<u32> {
    let raw = std::fs::read_to_string(path)?;
    raw.trim().parse().map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "malformed pid file"))
}

#[cfg(test)]
#[path = "config_loader_tests.rs"]
mod tests;
