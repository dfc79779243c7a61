// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration snapshot (§3, §6): the closed, typed option set the whole
//! core is driven by.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worker_type::WorkerType;

/// A worker kill-stage timeout: either a finite duration or "never
/// auto-escalate from this stage on the clock" (the `-1` sentinel, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillTimeout {
    Never,
    After(Duration),
}

impl KillTimeout {
    pub fn from_secs_signed(secs: i64) -> Result<Self, ConfigError> {
        match secs {
            -1 => Ok(Self::Never),
            s if s >= 0 => Ok(Self::After(Duration::from_secs(s as u64))),
            other => Err(ConfigError::InvalidValue {
                key: "kill_timeout",
                reason: format!("must be -1 or >= 0, got {other}"),
            }),
        }
    }

    /// `now - stage_entered_at > timeout`, or `false` for [`Self::Never`].
    pub fn elapsed_exceeds(self, elapsed: Duration) -> bool {
        match self {
            Self::Never => false,
            Self::After(limit) => elapsed > limit,
        }
    }
}

impl Default for KillTimeout {
    fn default() -> Self {
        Self::After(Duration::from_secs(600))
    }
}

/// Logging verbosity (§6). `Fatal` has no direct analogue in the logging
/// facade the daemon crate builds on, so it is mapped onto `Error` at the
/// sink (documented at the mapping site).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Debug
    }
}

crate::simple_display! {
    LogLevel {
        Trace => "trace",
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
        Fatal => "fatal",
    }
}

impl LogLevel {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

/// Immutable configuration snapshot (§3). Produced fresh by a `ConfigLoader`
/// on every reload; compared for equality to decide whether a reload changed
/// anything observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -- Daemon --
    pub daemonize: bool,
    pub pid_path: Option<PathBuf>,
    pub supervisor: bool,
    pub daemon_process_name: Option<String>,
    pub chuser: Option<String>,
    pub chgroup: Option<String>,
    pub chumask: Option<u32>,
    pub daemonize_error_exit_code: i32,

    // -- Supervisor --
    pub server_process_name: Option<String>,
    pub restart_server_process: bool,
    pub enable_detach: bool,
    pub exit_on_detach: bool,
    pub disable_reload: bool,
    pub server_restart_wait: Duration,
    pub server_detach_wait: Duration,

    // -- Pool --
    pub worker_type: WorkerType,
    pub workers: u32,
    pub start_worker_delay: Duration,
    pub start_worker_delay_rand: f64,

    // -- Process backend --
    pub worker_process_name: Option<String>,
    pub worker_heartbeat_interval: Duration,
    pub worker_heartbeat_timeout: Duration,
    pub worker_graceful_kill_interval: Duration,
    pub worker_graceful_kill_interval_increment: Duration,
    pub worker_graceful_kill_timeout: KillTimeout,
    pub worker_immediate_kill_interval: Duration,
    pub worker_immediate_kill_interval_increment: Duration,
    pub worker_immediate_kill_timeout: KillTimeout,

    // -- Logger --
    pub log: Option<PathBuf>,
    pub log_level: LogLevel,
    pub log_rotate_age: u32,
    pub log_rotate_size: u64,
    pub log_stdout: bool,
    pub log_stderr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemonize: false,
            pid_path: None,
            supervisor: false,
            daemon_process_name: None,
            chuser: None,
            chgroup: None,
            chumask: None,
            daemonize_error_exit_code: 1,

            server_process_name: None,
            restart_server_process: false,
            enable_detach: true,
            exit_on_detach: false,
            disable_reload: false,
            server_restart_wait: Duration::from_secs_f64(1.0),
            server_detach_wait: Duration::from_secs_f64(10.0),

            worker_type: WorkerType::Embedded,
            workers: 1,
            start_worker_delay: Duration::ZERO,
            start_worker_delay_rand: 0.2,

            worker_process_name: None,
            worker_heartbeat_interval: Duration::from_secs_f64(1.0),
            worker_heartbeat_timeout: Duration::from_secs(180),
            worker_graceful_kill_interval: Duration::from_secs(15),
            worker_graceful_kill_interval_increment: Duration::from_secs(10),
            worker_graceful_kill_timeout: KillTimeout::After(Duration::from_secs(600)),
            worker_immediate_kill_interval: Duration::from_secs(10),
            worker_immediate_kill_interval_increment: Duration::from_secs(10),
            worker_immediate_kill_timeout: KillTimeout::After(Duration::from_secs(600)),

            log: None,
            log_level: LogLevel::Debug,
            log_rotate_age: 5,
            log_rotate_size: 1_048_576,
            log_stdout: true,
            log_stderr: true,
        }
    }
}

/// Errors produced while loading or validating a [`Config`] (§7 kind 2).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("`process` worker backend is unavailable on this platform")]
    ProcessBackendUnavailable,

    #[error("failed to read configuration source: {0}")]
    Source(String),
}

impl Config {
    /// Validate the closed option set (§6, §9 cross-platform note).
    ///
    /// Called at startup (fatal on failure) and on every reload (logged,
    /// previous snapshot retained on failure, §7 kind 2).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers > 100_000 {
            return Err(ConfigError::InvalidValue {
                key: "workers",
                reason: "unreasonably large worker pool".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.start_worker_delay_rand) {
            return Err(ConfigError::InvalidValue {
                key: "start_worker_delay_rand",
                reason: "must be within [0.0, 1.0]".into(),
            });
        }
        if self.worker_type == WorkerType::Process && !cfg!(unix) {
            return Err(ConfigError::ProcessBackendUnavailable);
        }
        if let Some(mask) = self.chumask {
            if mask > 0o777 {
                return Err(ConfigError::InvalidValue {
                    key: "chumask",
                    reason: "must be a valid octal umask (<= 0o777)".into(),
                });
            }
        }
        if self.daemonize_error_exit_code < 0 || self.daemonize_error_exit_code > 255 {
            return Err(ConfigError::InvalidValue {
                key: "daemonize_error_exit_code",
                reason: "must fit in a process exit code (0..=255)".into(),
            });
        }
        Ok(())
    }

    /// Keys marked `[D]` in §6 that may change across a reload without a
    /// process restart. Used by the server loop to decide which fields to
    /// copy from a freshly loaded snapshot versus log-and-ignore (§4.5).
    pub fn dynamic_fields_changed(&self, other: &Config) -> bool {
        self.server_restart_wait != other.server_restart_wait
            || self.server_detach_wait != other.server_detach_wait
            || self.workers != other.workers
            || self.start_worker_delay != other.start_worker_delay
            || self.start_worker_delay_rand != other.start_worker_delay_rand
            || self.worker_process_name != other.worker_process_name
            || self.worker_heartbeat_interval != other.worker_heartbeat_interval
            || self.worker_heartbeat_timeout != other.worker_heartbeat_timeout
            || self.worker_graceful_kill_interval != other.worker_graceful_kill_interval
            || self.worker_graceful_kill_interval_increment
                != other.worker_graceful_kill_interval_increment
            || self.worker_graceful_kill_timeout != other.worker_graceful_kill_timeout
            || self.worker_immediate_kill_interval != other.worker_immediate_kill_interval
            || self.worker_immediate_kill_interval_increment
                != other.worker_immediate_kill_interval_increment
            || self.worker_immediate_kill_timeout != other.worker_immediate_kill_timeout
            || self.log_level != other.log_level
    }

    /// Build the snapshot to install after a reload: start from the
    /// previous configuration (`self`) and copy over only the `[D]`
    /// fields from `new`, leaving every non-reloadable field exactly as
    /// it was (§4.9: "non-reloadable keys changing across a reload are
    /// logged at `warn` and otherwise ignored until the next full
    /// process restart").
    pub fn with_dynamic_fields_from(&self, new: &Config) -> Config {
        Config {
            server_restart_wait: new.server_restart_wait,
            server_detach_wait: new.server_detach_wait,
            workers: new.workers,
            start_worker_delay: new.start_worker_delay,
            start_worker_delay_rand: new.start_worker_delay_rand,
            worker_process_name: new.worker_process_name.clone(),
            worker_heartbeat_interval: new.worker_heartbeat_interval,
            worker_heartbeat_timeout: new.worker_heartbeat_timeout,
            worker_graceful_kill_interval: new.worker_graceful_kill_interval,
            worker_graceful_kill_interval_increment: new.worker_graceful_kill_interval_increment,
            worker_graceful_kill_timeout: new.worker_graceful_kill_timeout,
            worker_immediate_kill_interval: new.worker_immediate_kill_interval,
            worker_immediate_kill_interval_increment: new.worker_immediate_kill_interval_increment,
            worker_immediate_kill_timeout: new.worker_immediate_kill_timeout,
            log_level: new.log_level,
            ..self.clone()
        }
    }

    /// Names of non-`[D]` fields that differ between `self` and `other`,
    /// for warn-logging the reload keys that won't take effect until a
    /// full process restart.
    pub fn non_dynamic_diffs(&self, other: &Config) -> Vec<&'static str> {
        let mut diffs = Vec::new();
        macro_rules! check {
            ($($field:ident),+ $(,)?) => {
                $( if self.$field != other.$field { diffs.push(stringify!($field)); } )+
            };
        }
        check!(
            daemonize,
            pid_path,
            supervisor,
            daemon_process_name,
            chuser,
            chgroup,
            chumask,
            daemonize_error_exit_code,
            server_process_name,
            restart_server_process,
            enable_detach,
            exit_on_detach,
            disable_reload,
            worker_type,
            log,
            log_rotate_age,
            log_rotate_size,
            log_stdout,
            log_stderr,
        );
        diffs
    }

    /// Per-stage kill interval/increment/timeout, indexed by [`crate::worker::KillStage`].
    ///
    /// `Forced` has no interval/increment (it is sent once, unblockable) so
    /// callers only index this for `Graceful`/`Immediate`.
    pub fn kill_interval(&self, stage: crate::worker::KillStage) -> Duration {
        match stage {
            crate::worker::KillStage::Graceful => self.worker_graceful_kill_interval,
            crate::worker::KillStage::Immediate => self.worker_immediate_kill_interval,
            crate::worker::KillStage::Forced => Duration::ZERO,
        }
    }

    pub fn kill_increment(&self, stage: crate::worker::KillStage) -> Duration {
        match stage {
            crate::worker::KillStage::Graceful => self.worker_graceful_kill_interval_increment,
            crate::worker::KillStage::Immediate => self.worker_immediate_kill_interval_increment,
            crate::worker::KillStage::Forced => Duration::ZERO,
        }
    }

    pub fn kill_timeout(&self, stage: crate::worker::KillStage) -> KillTimeout {
        match stage {
            crate::worker::KillStage::Graceful => self.worker_graceful_kill_timeout,
            crate::worker::KillStage::Immediate => self.worker_immediate_kill_timeout,
            crate::worker::KillStage::Forced => KillTimeout::Never,
        }
    }
}

/// Pluggable configuration source (§4.9, §6). The core only depends on this
/// trait; the daemon crate ships one default TOML-backed implementation.
pub trait ConfigLoader: Send + Sync {
    fn load(&self) -> Result<Config, ConfigError>;
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ConfigBuilder => Config {
        set {
            daemonize: bool = false,
            supervisor: bool = false,
            restart_server_process: bool = false,
            enable_detach: bool = true,
            exit_on_detach: bool = false,
            disable_reload: bool = false,
            server_restart_wait: Duration = Duration::from_secs_f64(1.0),
            server_detach_wait: Duration = Duration::from_secs_f64(10.0),
            worker_type: WorkerType = WorkerType::Embedded,
            workers: u32 = 1,
            start_worker_delay: Duration = Duration::ZERO,
            start_worker_delay_rand: f64 = 0.2,
            worker_heartbeat_interval: Duration = Duration::from_secs_f64(1.0),
            worker_heartbeat_timeout: Duration = Duration::from_secs(180),
            worker_graceful_kill_interval: Duration = Duration::from_secs(15),
            worker_graceful_kill_interval_increment: Duration = Duration::from_secs(10),
            worker_graceful_kill_timeout: KillTimeout = KillTimeout::After(Duration::from_secs(600)),
            worker_immediate_kill_interval: Duration = Duration::from_secs(10),
            worker_immediate_kill_interval_increment: Duration = Duration::from_secs(10),
            worker_immediate_kill_timeout: KillTimeout = KillTimeout::After(Duration::from_secs(600)),
            log_level: LogLevel = LogLevel::Debug,
            log_rotate_age: u32 = 5,
            log_rotate_size: u64 = 1_048_576,
            log_stdout: bool = true,
            log_stderr: bool = true,
            daemonize_error_exit_code: i32 = 1,
            chumask: Option<u32> = None,
        }
        option {
            pid_path: PathBuf = None,
            daemon_process_name: String = None,
            chuser: String = None,
            chgroup: String = None,
            server_process_name: String = None,
            worker_process_name: String = None,
            log: PathBuf = None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
