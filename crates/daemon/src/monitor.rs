// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-monitor (C4): the per-worker-slot state machine that drives a
//! single [`WorkerBackend`] through spawn, heartbeat, and escalating
//! graceful/immediate/forced termination.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{info, warn};
use warden_core::{Config, Event, KillStage, Signal, WorkerId, WorkerState, WorkerTiming, WorkerType};

use crate::error::DaemonError;
use crate::hooks::{Context, ServerHandle, WorkerHooks};
use crate::worker_backend::{SignalOutcome, WorkerBackend};

fn stage_signal(stage: KillStage) -> Signal {
    match stage {
        KillStage::Graceful => Signal::Term,
        KillStage::Immediate => Signal::Quit,
        KillStage::Forced => Signal::Kill,
    }
}

/// Drives one worker slot's [`WorkerState`] machine (§4.4).
pub struct WorkerMonitor {
    id: WorkerId,
    worker_type: WorkerType,
    state: WorkerState,
    timing: WorkerTiming,
    backend: Box<dyn WorkerBackend>,
    hooks: Arc<dyn WorkerHooks>,
    server: ServerHandle,
    span: tracing::Span,
    pending_stop: Option<KillStage>,
    reload_pending: bool,
}

impl WorkerMonitor {
    pub fn new(
        id: WorkerId,
        worker_type: WorkerType,
        backend: Box<dyn WorkerBackend>,
        hooks: Arc<dyn WorkerHooks>,
        server: ServerHandle,
        now: Instant,
    ) -> Self {
        let span = tracing::info_span!("worker", id = id.0);
        Self {
            id,
            worker_type,
            state: WorkerState::Idle,
            timing: WorkerTiming::new(now),
            backend,
            hooks,
            server,
            span,
            pending_stop: None,
            reload_pending: false,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn next_start_at(&self) -> Instant {
        self.timing.next_start_at
    }

    pub fn next_signal_at(&self) -> Option<Instant> {
        self.state.kill_stage().map(|_| self.timing.next_signal_at)
    }

    fn ctx(&self) -> Context {
        Context::for_worker(self.server.clone(), self.span.clone(), self.id)
    }

    /// Apply a signal-queue event to this worker (§4.4, §4.3). Restart
    /// events are equivalent to the corresponding stop event at this level:
    /// whether the slot actually restarts afterwards is just the normal
    /// `Finished -> Idle -> Starting` cycle continuing because `desired`
    /// is still true.
    pub fn request_event(&mut self, event: Event) {
        let stage = match event {
            Event::GracefulStop | Event::GracefulRestart => KillStage::Graceful,
            Event::ImmediateStop | Event::ImmediateRestart => KillStage::Immediate,
            Event::Reload => {
                self.reload_pending = true;
                return;
            }
            _ => return,
        };

        match self.state {
            WorkerState::Idle | WorkerState::Finished => {}
            WorkerState::Starting => {
                self.pending_stop = Some(self.pending_stop.map_or(stage, |s| s.max(stage)));
            }
            WorkerState::Running => {
                // entered on the next tick so the caller supplies `now`
                self.pending_stop = Some(stage);
            }
            WorkerState::StoppingGraceful if stage > KillStage::Graceful => {
                self.pending_stop = Some(stage);
            }
            WorkerState::StoppingGraceful
            | WorkerState::StoppingImmediate
            | WorkerState::StoppingForced => {}
        }
    }

    fn send_stage_signal(&mut self, signal: Signal) {
        if self.backend.signal(signal) == SignalOutcome::Unsupported {
            warn!(parent: &self.span, ?signal, "signal unsupported on this worker's backend");
        }
    }

    fn enter_stopping(&mut self, stage: KillStage, now: Instant) {
        self.state = match stage {
            KillStage::Graceful => WorkerState::StoppingGraceful,
            KillStage::Immediate => WorkerState::StoppingImmediate,
            KillStage::Forced => WorkerState::StoppingForced,
        };
        self.timing.enter_stage(now);
        info!(parent: &self.span, ?stage, "worker entering stopping stage");
        // Forced termination is a single unblockable kill, sent right away.
        // Graceful/Immediate instead rely on the per-tick escalation check
        // below, which fires on the very next tick since `next_signal_at`
        // was just reset to `now`.
        if stage == KillStage::Forced && self.backend.force_kill() == SignalOutcome::Unsupported {
            warn!(parent: &self.span, "force_kill unsupported on this worker's backend");
        }
    }

    fn finish(&mut self, now: Instant, config: &Config) {
        self.state = WorkerState::Finished;
        self.timing.last_heartbeat_at = None;
        let delay = jittered_restart_delay(config);
        self.timing.next_start_at = now + delay;
        self.state = WorkerState::Idle;
        info!(parent: &self.span, next_start_in_ms = delay.as_millis() as u64, "worker finished, rescheduled");
    }

    /// Advance this worker's state machine by one tick. `desired` is
    /// whether the server currently wants this slot running (index within
    /// the configured pool size and the server isn't shutting it down).
    pub async fn tick(&mut self, now: Instant, config: &Config, desired: bool) -> Result<(), DaemonError> {
        match self.state {
            WorkerState::Idle => {
                if desired && now >= self.timing.next_start_at {
                    self.hooks.initialize(&self.ctx()).await;
                    self.hooks.before_fork(&self.ctx()).await;
                    self.backend.spawn(self.ctx(), Arc::clone(&self.hooks)).await?;
                    self.state = WorkerState::Starting;
                    self.hooks.after_start(&self.ctx()).await;
                }
            }
            WorkerState::Starting => {
                if !self.backend.is_alive() {
                    self.finish(now, config);
                    return Ok(());
                }
                let ready = if self.worker_type.uses_heartbeat_pipe() {
                    self.backend.poll_heartbeat()
                } else {
                    true
                };
                if ready {
                    self.timing.last_heartbeat_at = Some(now);
                    self.state = WorkerState::Running;
                    if let Some(stage) = self.pending_stop.take() {
                        self.enter_stopping(stage, now);
                    }
                }
            }
            WorkerState::Running => {
                if !self.backend.is_alive() {
                    self.finish(now, config);
                    return Ok(());
                }
                if self.worker_type.uses_heartbeat_pipe() {
                    if self.backend.poll_heartbeat() {
                        self.timing.last_heartbeat_at = Some(now);
                    } else if let Some(last) = self.timing.last_heartbeat_at {
                        if now.saturating_duration_since(last) > config.worker_heartbeat_timeout {
                            warn!(parent: &self.span, "worker heartbeat stalled, forcing immediate stop");
                            self.enter_stopping(KillStage::Immediate, now);
                            return Ok(());
                        }
                    }
                } else {
                    self.timing.last_heartbeat_at = Some(now);
                }

                if self.reload_pending {
                    self.reload_pending = false;
                    self.hooks.reload(&self.ctx()).await;
                }

                if let Some(stage) = self.pending_stop.take() {
                    self.enter_stopping(stage, now);
                } else if !desired {
                    self.enter_stopping(KillStage::Graceful, now);
                }
            }
            WorkerState::StoppingGraceful | WorkerState::StoppingImmediate => {
                if !self.backend.is_alive() {
                    self.finish(now, config);
                    return Ok(());
                }
                let Some(stage) = self.state.kill_stage() else { return Ok(()) };

                if let Some(requested) = self.pending_stop.take() {
                    if requested > stage {
                        self.enter_stopping(requested, now);
                        return Ok(());
                    }
                }

                let elapsed = now.saturating_duration_since(self.timing.stage_entered_at);
                if config.kill_timeout(stage).elapsed_exceeds(elapsed) {
                    let next = match stage {
                        KillStage::Graceful => KillStage::Immediate,
                        KillStage::Immediate => KillStage::Forced,
                        KillStage::Forced => KillStage::Forced,
                    };
                    if next != stage {
                        self.enter_stopping(next, now);
                        return Ok(());
                    }
                }

                if now >= self.timing.next_signal_at {
                    self.send_stage_signal(stage_signal(stage));
                    let interval = config.kill_interval(stage)
                        + config.kill_increment(stage) * self.timing.times_sent_in_stage;
                    self.timing.next_signal_at = now + interval;
                    self.timing.times_sent_in_stage += 1;
                }
            }
            WorkerState::StoppingForced => {
                if !self.backend.is_alive() {
                    self.finish(now, config);
                }
            }
            WorkerState::Finished => {
                // Transient; `finish` always moves straight back to `Idle`.
            }
        }
        Ok(())
    }
}

fn jittered_restart_delay(config: &Config) -> Duration {
    let frac = config.start_worker_delay_rand;
    if frac <= 0.0 || config.start_worker_delay.is_zero() {
        return config.start_worker_delay;
    }
    let jitter = rand::thread_rng().gen_range(-frac..=frac);
    config.start_worker_delay.mul_f64((1.0 + jitter).max(0.0))
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
