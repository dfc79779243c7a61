// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process backend: a real OS child. This binary re-execs itself with
//! `WARDEN_ROLE=worker` rather than forking, to stay inside the
//! `unsafe_code = "forbid"` lint — `main.rs` intercepts that role and runs
//! the worker hooks directly instead of the supervisor/server loop.
//! Heartbeats arrive over the FIFO described in [`crate::heartbeat`].

use std::io;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal as NixSignal};
use nix::unistd::Pid;
use tracing::{error, warn};
use warden_core::Signal;

use super::{SignalOutcome, WorkerBackend};
use crate::heartbeat::{self, HeartbeatReader};
use crate::hooks::{Context, WorkerHooks};

fn to_nix_signal(signal: Signal) -> NixSignal {
    match signal {
        Signal::Term => NixSignal::SIGTERM,
        Signal::Quit => NixSignal::SIGQUIT,
        Signal::Usr1 => NixSignal::SIGUSR1,
        Signal::Hup => NixSignal::SIGHUP,
        Signal::Usr2 => NixSignal::SIGUSR2,
        Signal::Int => NixSignal::SIGINT,
        Signal::Cont => NixSignal::SIGCONT,
        Signal::Kill => NixSignal::SIGKILL,
    }
}

pub struct ProcessBackend {
    run_dir: PathBuf,
    worker_index: u32,
    child: Option<tokio::process::Child>,
    heartbeat: Option<HeartbeatReader>,
}

impl ProcessBackend {
    pub fn new(run_dir: PathBuf, worker_index: u32) -> Self {
        Self { run_dir, worker_index, child: None, heartbeat: None }
    }

    fn pid(&self) -> Option<i32> {
        self.child.as_ref().and_then(|c| c.id()).map(|p| p as i32)
    }
}

#[async_trait]
impl WorkerBackend for ProcessBackend {
    async fn spawn(&mut self, ctx: Context, _hooks: Arc<dyn WorkerHooks>) -> io::Result<()> {
        let fifo = heartbeat::fifo_path(&self.run_dir, self.worker_index);
        let reader = heartbeat::fifo_reader(&fifo)?;

        let exe = std::env::current_exe()?;
        let mut command = tokio::process::Command::new(&exe);
        command
            .env("WARDEN_ROLE", "worker")
            .env("WARDEN_WORKER_INDEX", self.worker_index.to_string())
            .env("WARDEN_HEARTBEAT_PATH", &fifo);
        if let Some(name) = &ctx.config().worker_process_name {
            command.arg0(name);
        }

        let child = command.spawn()?;
        self.child = Some(child);
        self.heartbeat = Some(reader);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else { return false };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(_status)) => {
                self.child = None;
                false
            }
            Err(e) => {
                error!(error = %e, "failed to poll worker process status");
                false
            }
        }
    }

    fn poll_heartbeat(&mut self) -> bool {
        self.heartbeat.as_ref().and_then(|h| h.poll_beat().ok()).unwrap_or(false)
    }

    fn signal(&mut self, signal: Signal) -> SignalOutcome {
        let Some(pid) = self.pid() else { return SignalOutcome::Unsupported };
        match signal::kill(Pid::from_raw(pid), to_nix_signal(signal)) {
            Ok(()) => SignalOutcome::Sent,
            Err(nix::errno::Errno::ESRCH) => SignalOutcome::Unsupported,
            Err(e) => {
                warn!(error = %e, pid, "failed to deliver signal to worker process");
                SignalOutcome::Unsupported
            }
        }
    }

    async fn join(&mut self, timeout: Duration) -> bool {
        let Some(child) = self.child.as_mut() else { return true };
        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(_) => {
                self.child = None;
                true
            }
            Err(_elapsed) => false,
        }
    }

    fn force_kill(&mut self) -> SignalOutcome {
        let Some(child) = self.child.as_mut() else { return SignalOutcome::Unsupported };
        match child.start_kill() {
            Ok(()) => SignalOutcome::Sent,
            Err(e) => {
                warn!(error = %e, "failed to SIGKILL worker process");
                SignalOutcome::Unsupported
            }
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
