// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor loop (C6): owns exactly one Server child, restarts it on
//! exit, and implements the live-restart (detach) protocol (§4.6).

use std::os::unix::process::CommandExt as _;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};
use warden_core::{Config, Event};

use crate::command_channel::{self, CommandWriter};
use crate::dump::{write_dump, Dumpable};
use crate::error::DaemonError;
use crate::signal_queue::SignalQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Init,
    Running,
    Restarting,
    Detaching,
    Exit,
}

struct ServerDescriptor {
    generation: u64,
    child: tokio::process::Child,
    command: CommandWriter,
}

impl ServerDescriptor {
    fn try_wait(&mut self) -> std::io::Result<Option<std::process::ExitStatus>> {
        self.child.try_wait()
    }
}

/// Supervises one Server child process, restarting it on exit or
/// live-restart request (§4.6). Owns no worker-level state at all — that
/// is entirely the Server's concern, one process away.
pub struct Supervisor {
    state: SupervisorState,
    config: Config,
    run_dir: PathBuf,
    signals: SignalQueue,
    /// The active server: the original one, or the detach protocol's
    /// replacement once spawned. `None` only for the brief gap between
    /// taking the old descriptor at detach start and spawning its
    /// replacement.
    current: Option<ServerDescriptor>,
    /// The server being replaced, present only during a detach until it
    /// exits and is reaped (§4.6 step 4: "coexist until the old one
    /// finishes").
    detaching: Option<ServerDescriptor>,
    detach_deadline: Option<Instant>,
    replacement_spawned: bool,
    next_generation: u64,
    last_start: Instant,
    restart_at: Option<Instant>,
    shutting_down: bool,
    span: tracing::Span,
}

impl Supervisor {
    pub fn new(config: Config, run_dir: PathBuf, signals: SignalQueue) -> Self {
        Self {
            state: SupervisorState::Init,
            config,
            run_dir,
            signals,
            current: None,
            detaching: None,
            detach_deadline: None,
            replacement_spawned: false,
            next_generation: 0,
            last_start: Instant::now(),
            restart_at: None,
            shutting_down: false,
            span: tracing::info_span!("supervisor"),
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn spawn_server(&mut self) -> Result<ServerDescriptor, DaemonError> {
        let generation = self.next_generation;
        self.next_generation += 1;

        let fifo = command_channel::path(&self.run_dir, generation);
        let command = command_channel::writer(&fifo)?;

        let exe = std::env::current_exe()?;
        let mut cmd = tokio::process::Command::new(&exe);
        cmd.env("WARDEN_ROLE", "server")
            .env("WARDEN_GENERATION", generation.to_string())
            .env("WARDEN_COMMAND_PATH", &fifo);
        if let Some(name) = &self.config.server_process_name {
            cmd.arg0(name);
        }

        let child = cmd.spawn()?;
        info!(parent: &self.span, generation, pid = child.id(), "spawned server");
        Ok(ServerDescriptor { generation, child, command })
    }

    pub async fn start(&mut self) -> Result<(), DaemonError> {
        let server = self.spawn_server()?;
        self.current = Some(server);
        self.last_start = Instant::now();
        self.state = SupervisorState::Running;
        Ok(())
    }

    async fn forward(&self, event: Event) {
        let Some(server) = &self.current else {
            warn!(parent: &self.span, ?event, "no active server to forward event to");
            return;
        };
        if let Err(err) = server.command.send(event).await {
            warn!(parent: &self.span, ?err, "failed forwarding event to server");
        }
    }

    async fn drain_signals(&mut self) {
        while let Some(event) = self.signals.pop() {
            self.apply_event(event).await;
        }
    }

    async fn apply_event(&mut self, event: Event) {
        match event {
            Event::Detach => self.begin_detach().await,
            Event::GracefulStop | Event::ImmediateStop => {
                self.shutting_down = true;
                self.forward(event).await;
            }
            Event::Dump => write_dump(std::process::id(), self),
            other => self.forward(other).await,
        }
    }

    async fn begin_detach(&mut self) {
        if !self.config.enable_detach {
            warn!(parent: &self.span, "detach requested but enable_detach is false, ignoring");
            return;
        }
        if self.detaching.is_some() {
            // Further detach requests while detaching are ignored (§4.6 step 4).
            return;
        }
        let Some(old) = self.current.take() else { return };
        if let Err(err) = old.command.send(Event::Detach).await {
            warn!(parent: &self.span, ?err, "failed forwarding detach to old server");
        }
        self.detaching = Some(old);
        self.detach_deadline = Some(Instant::now() + self.config.server_detach_wait);
        self.replacement_spawned = false;
        self.state = SupervisorState::Detaching;
        info!(parent: &self.span, "detach initiated");
    }

    fn reap(descriptor: ServerDescriptor, status: std::process::ExitStatus, span: &tracing::Span) {
        info!(parent: span, generation = descriptor.generation, code = status.code(), "server exited");
    }

    /// Spawn the detach protocol's replacement server, whether triggered
    /// by the old one exiting early or by `server_detach_wait` elapsing.
    fn spawn_replacement(&mut self) -> Result<(), DaemonError> {
        let server = self.spawn_server()?;
        self.current = Some(server);
        self.last_start = Instant::now();
        self.replacement_spawned = true;
        Ok(())
    }

    /// One loop iteration: reap exited children, advance the detach
    /// protocol, and schedule restarts.
    pub async fn tick(&mut self) -> Result<(), DaemonError> {
        self.drain_signals().await;

        if let Some(old) = &mut self.detaching {
            if let Ok(Some(status)) = old.try_wait() {
                let old = self.detaching.take().unwrap();
                let generation = old.generation;
                Self::reap(old, status, &self.span);
                if self.replacement_spawned {
                    self.state = SupervisorState::Running;
                } else if self.config.exit_on_detach {
                    info!(parent: &self.span, generation, "old server exited before deadline, exit_on_detach set");
                    self.state = SupervisorState::Exit;
                } else {
                    self.spawn_replacement()?;
                    self.state = SupervisorState::Running;
                }
            } else if let Some(deadline) = self.detach_deadline {
                if !self.replacement_spawned && Instant::now() >= deadline {
                    info!(parent: &self.span, "detach deadline elapsed, spawning replacement alongside the old server");
                    self.spawn_replacement()?;
                    // state stays Detaching: the old server is still being
                    // tracked in `self.detaching` until it exits.
                }
            }
        }

        if self.state == SupervisorState::Exit {
            return Ok(());
        }

        if let Some(current) = &mut self.current {
            if let Ok(Some(status)) = current.try_wait() {
                let current = self.current.take().unwrap();
                Self::reap(current, status, &self.span);
                if self.shutting_down {
                    self.state = SupervisorState::Exit;
                } else {
                    self.restart_at = Some(Instant::now().max(self.last_start + self.config.server_restart_wait));
                    self.state = SupervisorState::Restarting;
                }
            }
        }

        if self.state == SupervisorState::Restarting {
            if let Some(at) = self.restart_at {
                if Instant::now() >= at {
                    self.spawn_replacement()?;
                    self.restart_at = None;
                    self.state = SupervisorState::Running;
                }
            }
        }

        Ok(())
    }

    pub fn is_exited(&self) -> bool {
        self.state == SupervisorState::Exit
    }

    /// Drive the supervisor to completion, polling on a short fixed tick —
    /// the supervisor's own scheduling is coarse (restart/detach waits are
    /// seconds, not the sub-second precision the worker escalation clock
    /// needs) so a fixed poll interval is simpler than computing a precise
    /// wakeup and is what the reference binary uses.
    pub async fn run(&mut self) -> Result<(), DaemonError> {
        self.start().await?;
        while !self.is_exited() {
            self.tick().await?;
            if !self.is_exited() {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
        Ok(())
    }
}

impl Dumpable for Supervisor {
    fn describe(&self) -> Vec<String> {
        vec![format!("supervisor: {:?}", self.state)]
    }

    fn role(&self) -> &'static str {
        "supervisor"
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
