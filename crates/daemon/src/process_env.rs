// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process environment (C10): PID file, daemonization, and privilege drop,
//! behind one narrow trait so the state machines never touch the real
//! process table directly.
//!
//! The daemonization this crate ships deliberately does not fork: a real
//! double-fork-and-detach needs `unsafe` (the child of `fork()` may only
//! call async-signal-safe functions until it execs or calls `_exit`, a
//! contract `std`/`tokio` do not uphold), which the workspace forbids.
//! `setsid` alone gets a process out of its controlling terminal's session,
//! which covers the common "run under a process supervisor" case; true
//! background detachment from an interactive shell is left to the caller
//! (`wardend &`, a systemd unit, or an init system), consistent with this
//! being out of scope beyond the trait boundary (§1, §4.10).

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nix::unistd::{Gid, Uid, User, Group};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DaemonError;

#[derive(Debug, Error)]
pub enum ProcessEnvError {
    #[error("failed to acquire PID file lock at {0}: daemon already running?")]
    PidLockFailed(PathBuf),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nix error: {0}")]
    Nix(#[from] nix::Error),
}

impl From<ProcessEnvError> for DaemonError {
    fn from(err: ProcessEnvError) -> Self {
        match err {
            ProcessEnvError::PidLockFailed(p) => DaemonError::PidLockFailed(p),
            ProcessEnvError::Io(e) => DaemonError::Io(e),
            other => DaemonError::Privilege(other.to_string()),
        }
    }
}

/// A held PID-file lock. Released (and the file removed) on `Drop`, so the
/// daemon can never leak a stale lock on a clean exit path (§5: "removed on
/// clean exit only by that owner").
pub struct PidFileGuard {
    path: PathBuf,
    file: std::fs::File,
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        if let Err(err) = std::fs::remove_file(&self.path) {
            warn!(?err, path = %self.path.display(), "failed to remove pid file on exit");
        }
    }
}

/// Process-table collaborators the core depends on only through this trait
/// (§4.10). The default implementation backs the reference binary; tests
/// use [`NoopProcessEnvironment`].
pub trait ProcessEnvironment: Send + Sync {
    fn acquire_pid_file(&self, path: &Path) -> Result<PidFileGuard, ProcessEnvError>;
    fn daemonize(&self) -> Result<(), ProcessEnvError>;
    fn drop_privileges(
        &self,
        user: Option<&str>,
        group: Option<&str>,
        umask: Option<u32>,
    ) -> Result<(), ProcessEnvError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProcessEnvironment;

impl ProcessEnvironment for DefaultProcessEnvironment {
    fn acquire_pid_file(&self, path: &Path) -> Result<PidFileGuard, ProcessEnvError> {
        let file = OpenOptions::new().create(true).write(true).truncate(false).open(path)?;
        file.try_lock_exclusive().map_err(|_| ProcessEnvError::PidLockFailed(path.to_path_buf()))?;
        file.set_len(0)?;
        (&file).write_all(format!("{}\n", std::process::id()).as_bytes())?;
        file.sync_all()?;
        info!(path = %path.display(), pid = std::process::id(), "acquired pid file");
        Ok(PidFileGuard { path: path.to_path_buf(), file })
    }

    fn daemonize(&self) -> Result<(), ProcessEnvError> {
        nix::unistd::setsid()?;
        Ok(())
    }

    fn drop_privileges(
        &self,
        user: Option<&str>,
        group: Option<&str>,
        umask: Option<u32>,
    ) -> Result<(), ProcessEnvError> {
        if let Some(name) = group {
            let group = Group::from_name(name)?.ok_or_else(|| ProcessEnvError::UnknownGroup(name.to_string()))?;
            nix::unistd::setgid(Gid::from_raw(group.gid.as_raw()))?;
        }
        if let Some(name) = user {
            let user = User::from_name(name)?.ok_or_else(|| ProcessEnvError::UnknownUser(name.to_string()))?;
            nix::unistd::setuid(Uid::from_raw(user.uid.as_raw()))?;
        }
        if let Some(mask) = umask {
            nix::sys::stat::umask(nix::sys::stat::Mode::from_bits_truncate(mask));
        }
        Ok(())
    }
}

/// No-op implementation substituted in tests, so the core's test suite
/// never touches the real process table, PID namespace, or filesystem
/// outside a tempdir the test itself manages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProcessEnvironment;

impl ProcessEnvironment for NoopProcessEnvironment {
    fn acquire_pid_file(&self, path: &Path) -> Result<PidFileGuard, ProcessEnvError> {
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
        Ok(PidFileGuard { path: path.to_path_buf(), file })
    }

    fn daemonize(&self) -> Result<(), ProcessEnvError> {
        Ok(())
    }

    fn drop_privileges(&self, _user: Option<&str>, _group: Option<&str>, _umask: Option<u32>) -> Result<(), ProcessEnvError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "process_env_tests.rs"]
mod tests;
