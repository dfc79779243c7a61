// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server loop (C5): owns the worker-monitor pool, sizes it to
//! `config.workers`, paces restarts, and drives the `Init -> BeforeRun ->
//! Running -> AfterRun -> Exit` lifecycle (§4.5).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use warden_core::{Clock, Config, ConfigLoader, Event, KillStage, SystemClock, WorkerId, WorkerState};

use crate::dump::{write_dump, Dumpable};
use crate::error::DaemonError;
use crate::hooks::{Context, ServerHandle, ServerHooks, WorkerHooks};
use crate::monitor::WorkerMonitor;
use crate::signal_queue::SignalQueue;
use crate::worker_backend::{EmbeddedBackend, ProcessBackend, ThreadBackend, WorkerBackend};

/// Top-level server lifecycle state (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Init,
    BeforeRun,
    Running,
    AfterRun,
    Exit,
}

fn new_backend(config: &Config, run_dir: &PathBuf, worker_index: u32) -> Box<dyn WorkerBackend> {
    match config.worker_type {
        warden_core::WorkerType::Embedded => Box::new(EmbeddedBackend::new()),
        warden_core::WorkerType::Thread => Box::new(ThreadBackend::new()),
        warden_core::WorkerType::Process => Box::new(ProcessBackend::new(run_dir.clone(), worker_index)),
    }
}

/// The worker pool and lifecycle hooks that make up one running server
/// process. Generic over [`Clock`] so tests can drive it with a
/// [`warden_core::FakeClock`] and single-step calls to [`Server::tick`]
/// instead of real wall-clock sleeps (§8).
pub struct Server<C: Clock = SystemClock> {
    state: ServerState,
    handle: ServerHandle,
    server_hooks: Arc<dyn ServerHooks>,
    worker_hooks: Arc<dyn WorkerHooks>,
    config_loader: Arc<dyn ConfigLoader>,
    monitors: Vec<WorkerMonitor>,
    run_dir: PathBuf,
    signals: SignalQueue,
    clock: C,
    span: tracing::Span,
    shutting_down: bool,
    immediate_shutdown: bool,
    disable_reload: bool,
}

impl<C: Clock> Server<C> {
    pub fn new(
        config: Config,
        config_loader: Arc<dyn ConfigLoader>,
        server_hooks: Arc<dyn ServerHooks>,
        worker_hooks: Arc<dyn WorkerHooks>,
        signals: SignalQueue,
        run_dir: PathBuf,
        clock: C,
    ) -> Self {
        let disable_reload = config.disable_reload;
        let handle = ServerHandle::new(Arc::new(config));
        Self {
            state: ServerState::Init,
            handle,
            server_hooks,
            worker_hooks,
            config_loader,
            monitors: Vec::new(),
            run_dir,
            signals,
            clock,
            span: tracing::info_span!("server"),
            shutting_down: false,
            immediate_shutdown: false,
            disable_reload,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn config(&self) -> Arc<Config> {
        self.handle.config()
    }

    fn ctx(&self) -> Context {
        Context::for_server(self.handle.clone(), self.span.clone())
    }

    /// Grow the monitor pool up to `config.workers`, assigning dense,
    /// stable worker IDs starting at the current length (§3: "created once
    /// at server start"; growth via reload simply extends the pool).
    fn ensure_pool_size(&mut self, now: Instant) {
        let config = self.config();
        while (self.monitors.len() as u32) < config.workers {
            let id = WorkerId::new(self.monitors.len() as u32);
            let backend = new_backend(&config, &self.run_dir, id.0);
            let monitor =
                WorkerMonitor::new(id, config.worker_type, backend, Arc::clone(&self.worker_hooks), self.handle.clone(), now);
            self.monitors.push(monitor);
        }
    }

    /// Run the server's `Init` phase once: validate config, notify hooks,
    /// move to `BeforeRun` then `Running`.
    pub async fn start(&mut self) -> Result<(), DaemonError> {
        self.state = ServerState::Init;
        self.server_hooks.initialize(&self.ctx()).await;

        self.state = ServerState::BeforeRun;
        self.server_hooks.before_run(&self.ctx()).await;
        self.ensure_pool_size(self.clock.now());

        self.state = ServerState::Running;
        info!(parent: &self.span, workers = self.config().workers, "server running");
        Ok(())
    }

    async fn drain_signals(&mut self) {
        while let Some(event) = self.signals.pop() {
            self.apply_event(event).await;
        }
    }

    async fn apply_event(&mut self, event: Event) {
        match event {
            Event::GracefulStop => self.begin_shutdown(KillStage::Graceful),
            Event::ImmediateStop => self.begin_shutdown(KillStage::Immediate),
            Event::GracefulRestart | Event::ImmediateRestart => {
                let stage = if event == Event::GracefulRestart { KillStage::Graceful } else { KillStage::Immediate };
                if self.config().restart_server_process {
                    self.begin_shutdown(stage);
                } else {
                    let restart_event =
                        if stage == KillStage::Graceful { Event::GracefulStop } else { Event::ImmediateStop };
                    for monitor in &mut self.monitors {
                        monitor.request_event(restart_event);
                    }
                }
            }
            Event::Reload => self.reload_pending().await,
            Event::Detach => {
                // Supervisor-level concern (§4.6); the server has nothing
                // of its own to do beyond logging the request landed.
                info!(parent: &self.span, "detach requested; supervisor owns the live-restart protocol");
            }
            Event::Dump => write_dump(std::process::id(), self),
        }
    }

    fn begin_shutdown(&mut self, stage: KillStage) {
        self.shutting_down = true;
        self.immediate_shutdown = stage == KillStage::Immediate;
        let stop_event = if self.immediate_shutdown { Event::ImmediateStop } else { Event::GracefulStop };
        for monitor in &mut self.monitors {
            if monitor.state() == WorkerState::Running || monitor.state() == WorkerState::Starting {
                monitor.request_event(stop_event);
            }
        }
    }

    /// Reload config (§4.5), notify `server.reload_config`, and push
    /// `Event::Reload` to every worker so `worker.reload` fires too
    /// (§4.7's hook table). Non-`[D]` fields that changed are logged at
    /// `warn` and left untouched until the next full process restart.
    async fn reload_pending(&mut self) {
        if self.disable_reload {
            warn!(parent: &self.span, "reload requested but disable_reload is set, ignoring");
            return;
        }
        match self.config_loader.load() {
            Ok(new_config) => {
                let old = self.config();
                for field in old.non_dynamic_diffs(&new_config) {
                    warn!(parent: &self.span, field, "non-reloadable key changed, ignoring until next restart");
                }
                if old.dynamic_fields_changed(&new_config) {
                    info!(parent: &self.span, "applying reloaded configuration");
                }
                let installed = old.with_dynamic_fields_from(&new_config);
                self.handle.set_config(Arc::new(installed));

                self.server_hooks.reload_config(&self.ctx()).await;
                for monitor in &mut self.monitors {
                    monitor.request_event(Event::Reload);
                }
            }
            Err(err) => {
                warn!(parent: &self.span, error = %err, "reload failed, keeping previous configuration");
            }
        }
    }

    /// One iteration of the server loop (§4.5 steps 1-3): drain signals,
    /// then advance every worker-monitor by one tick. Does not sleep;
    /// callers decide the pacing (real loop in [`Self::run`], direct calls
    /// from tests).
    pub async fn tick(&mut self, now: Instant) -> Result<(), DaemonError> {
        self.drain_signals().await;

        // A reload that raised `workers` needs new slots; shrinking is
        // handled below by `WorkerMonitor::tick`'s own `desired` branch,
        // not by shrinking this vec.
        if !self.shutting_down {
            self.ensure_pool_size(now);
        }

        let config = self.config();
        let desired_count = if self.shutting_down { 0 } else { config.workers };

        // Surplus slots (highest worker_id first doesn't matter here: each
        // monitor decides for itself from `desired`) are driven into
        // `StoppingGraceful` by `WorkerMonitor::tick` itself when `desired`
        // is false, covering both server shutdown and a reload shrink.
        for monitor in &mut self.monitors {
            let desired = !self.shutting_down && monitor.id().0 < desired_count;
            monitor.tick(now, &config, desired).await?;
        }

        Ok(())
    }

    /// `true` once every monitor has reached `Idle` with shutdown in
    /// progress and no desired slots remain, i.e. the server is ready for
    /// `AfterRun`/`Exit`.
    pub fn all_workers_finished(&self) -> bool {
        self.monitors.iter().all(|m| matches!(m.state(), WorkerState::Idle | WorkerState::Finished))
    }

    /// The instant the loop should next wake at, absent any new signal or
    /// heartbeat activity — the minimum of every monitor's next scheduled
    /// transition and the configured heartbeat poll interval.
    pub fn next_wakeup(&self, now: Instant) -> Instant {
        let heartbeat_interval = self.config().worker_heartbeat_interval.max(Duration::from_millis(1));
        let mut earliest = now + heartbeat_interval;
        for monitor in &self.monitors {
            earliest = earliest.min(monitor.next_start_at());
            if let Some(at) = monitor.next_signal_at() {
                earliest = earliest.min(at);
            }
        }
        earliest.max(now)
    }

    pub async fn finish(&mut self) -> Result<i32, DaemonError> {
        self.state = ServerState::AfterRun;
        self.server_hooks.after_run(&self.ctx()).await;
        self.state = ServerState::Exit;
        info!(parent: &self.span, "server exiting");
        Ok(0)
    }

    /// Drive the server to completion using real wall-clock sleeps,
    /// waking on whichever comes first: the next scheduled transition, the
    /// heartbeat poll interval, or a new signal (signalled by the caller
    /// pushing into `signals` from a concurrent task).
    pub async fn run(&mut self) -> Result<i32, DaemonError> {
        self.start().await?;

        loop {
            let now = self.clock.now();
            self.tick(now).await?;

            // `workers = 0` has no slots to ever finish and is never
            // `shutting_down` on its own, so it must be checked
            // independently or the loop spins on the heartbeat interval
            // forever (§4.5, §8: "workers = 0 terminates the server
            // cleanly via before_run -> after_run").
            let no_desired_slots = self.config().workers == 0 && self.all_workers_finished();
            if no_desired_slots || (self.shutting_down && self.all_workers_finished()) {
                break;
            }

            let wakeup = self.next_wakeup(now);
            let real_now = Instant::now();
            if wakeup > real_now {
                tokio::time::sleep(wakeup - real_now).await;
            } else {
                tokio::task::yield_now().await;
            }
        }

        self.finish().await
    }
}

impl<C: Clock> Dumpable for Server<C> {
    fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.monitors.iter().map(|m| format!("{}: {}", m.id(), m.state())).collect();
        lines.push(format!("server: {:?}", self.state));
        lines
    }

    fn role(&self) -> &'static str {
        "server"
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
