// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use warden_core::ConfigBuilder;

use super::*;
use crate::hooks::{ServerHandle, WorkerError};

struct FakeBackend {
    alive: Arc<AtomicBool>,
    beat_pending: Arc<AtomicBool>,
    signals: Arc<Mutex<Vec<Signal>>>,
    force_kills: Arc<AtomicBool>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(false)),
            beat_pending: Arc::new(AtomicBool::new(false)),
            signals: Arc::new(Mutex::new(Vec::new())),
            force_kills: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl WorkerBackend for FakeBackend {
    async fn spawn(&mut self, _ctx: Context, _hooks: Arc<dyn WorkerHooks>) -> std::io::Result<()> {
        self.alive.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn poll_heartbeat(&mut self) -> bool {
        self.beat_pending.swap(false, Ordering::SeqCst)
    }

    fn signal(&mut self, signal: Signal) -> SignalOutcome {
        self.signals.lock().unwrap().push(signal);
        SignalOutcome::Sent
    }

    async fn join(&mut self, _timeout: Duration) -> bool {
        !self.alive.load(Ordering::SeqCst)
    }

    fn force_kill(&mut self) -> SignalOutcome {
        self.force_kills.store(true, Ordering::SeqCst);
        self.alive.store(false, Ordering::SeqCst);
        SignalOutcome::Sent
    }
}

struct Noop;
#[async_trait::async_trait]
impl WorkerHooks for Noop {
    async fn run(&self, _ctx: &Context, _stop: crate::blocking_flag::BlockingFlag) -> Result<(), WorkerError> {
        Ok(())
    }
}

struct MonitorHandles {
    signals: Arc<Mutex<Vec<Signal>>>,
    alive: Arc<AtomicBool>,
    beat_pending: Arc<AtomicBool>,
    force_kills: Arc<AtomicBool>,
}

fn monitor(worker_type: WorkerType, config: &Config) -> (WorkerMonitor, MonitorHandles) {
    let backend = FakeBackend::new();
    let handles = MonitorHandles {
        signals: Arc::clone(&backend.signals),
        alive: Arc::clone(&backend.alive),
        beat_pending: Arc::clone(&backend.beat_pending),
        force_kills: Arc::clone(&backend.force_kills),
    };
    let server = ServerHandle::new(Arc::new(config.clone()));
    let mon = WorkerMonitor::new(
        WorkerId::new(0),
        worker_type,
        Box::new(backend),
        Arc::new(Noop),
        server,
        Instant::now(),
    );
    (mon, handles)
}

#[tokio::test]
async fn embedded_happy_path_reaches_running_then_idle_on_stop() {
    let config = ConfigBuilder::default().worker_type(WorkerType::Embedded).build();
    let (mut mon, handles) = monitor(WorkerType::Embedded, &config);

    let t0 = Instant::now();
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Starting);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Running);

    mon.request_event(Event::GracefulStop);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);

    // Simulate the worker having honored the stop and exited.
    handles.alive.store(false, Ordering::SeqCst);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Idle);
    assert!(mon.next_start_at() > t0);
}

#[tokio::test]
async fn process_graceful_escalates_to_immediate_then_forced_on_timeout() {
    let config = ConfigBuilder::default()
        .worker_type(WorkerType::Process)
        .worker_graceful_kill_interval(Duration::from_secs(1))
        .worker_graceful_kill_interval_increment(Duration::from_secs(0))
        .worker_graceful_kill_timeout(warden_core::KillTimeout::After(Duration::from_secs(3)))
        .worker_immediate_kill_interval(Duration::from_secs(1))
        .worker_immediate_kill_interval_increment(Duration::from_secs(0))
        .worker_immediate_kill_timeout(warden_core::KillTimeout::After(Duration::from_secs(2)))
        .build();
    let (mut mon, handles) = monitor(WorkerType::Process, &config);

    let t0 = Instant::now();
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Starting);

    handles.beat_pending.store(true, Ordering::SeqCst);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Running);

    mon.request_event(Event::GracefulStop);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);

    // First TERM goes out on the tick right after entry.
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(handles.signals.lock().unwrap().as_slice(), [Signal::Term]);

    // Graceful timeout (3s) elapses -> escalate to StoppingImmediate.
    mon.tick(t0 + Duration::from_secs(4), &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingImmediate);

    // First QUIT goes out on the following tick.
    mon.tick(t0 + Duration::from_secs(4), &config, true).await.unwrap();
    assert!(handles.signals.lock().unwrap().contains(&Signal::Quit));

    // Immediate timeout (2s from re-entry) elapses -> forced kill fires once.
    mon.tick(t0 + Duration::from_secs(7), &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingForced);
    assert!(handles.force_kills.load(Ordering::SeqCst));
    assert!(!handles.alive.load(Ordering::SeqCst));

    mon.tick(t0 + Duration::from_secs(7), &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Idle);
}

#[tokio::test]
async fn thread_escalation_timing_sends_signals_on_schedule() {
    let config = ConfigBuilder::default()
        .worker_type(WorkerType::Thread)
        .worker_graceful_kill_interval(Duration::from_secs(1))
        .worker_graceful_kill_interval_increment(Duration::from_secs(0))
        .worker_graceful_kill_timeout(warden_core::KillTimeout::After(Duration::from_secs(5)))
        .build();
    let (mut mon, handles) = monitor(WorkerType::Thread, &config);

    let t0 = Instant::now();
    mon.tick(t0, &config, true).await.unwrap();
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Running);

    mon.request_event(Event::GracefulStop);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);
    assert!(handles.signals.lock().unwrap().is_empty(), "no signal sent on the entry tick itself");

    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(handles.signals.lock().unwrap().as_slice(), [Signal::Term]);

    // Before the next interval elapses, no additional signal is sent.
    mon.tick(t0 + Duration::from_millis(500), &config, true).await.unwrap();
    assert_eq!(handles.signals.lock().unwrap().len(), 1);

    mon.tick(t0 + Duration::from_millis(1100), &config, true).await.unwrap();
    assert_eq!(handles.signals.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn kill_timeout_minus_one_never_escalates_on_the_clock() {
    let config = ConfigBuilder::default()
        .worker_type(WorkerType::Thread)
        .worker_graceful_kill_timeout(warden_core::KillTimeout::Never)
        .build();
    let (mut mon, _handles) = monitor(WorkerType::Thread, &config);

    let t0 = Instant::now();
    mon.tick(t0, &config, true).await.unwrap();
    mon.tick(t0, &config, true).await.unwrap();
    mon.request_event(Event::GracefulStop);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);

    mon.tick(t0 + Duration::from_secs(60 * 60 * 24), &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);
}

#[tokio::test]
async fn explicit_immediate_stop_escalates_past_a_never_timeout() {
    let config = ConfigBuilder::default()
        .worker_type(WorkerType::Thread)
        .worker_graceful_kill_timeout(warden_core::KillTimeout::Never)
        .build();
    let (mut mon, _handles) = monitor(WorkerType::Thread, &config);

    let t0 = Instant::now();
    mon.tick(t0, &config, true).await.unwrap();
    mon.tick(t0, &config, true).await.unwrap();
    mon.request_event(Event::GracefulStop);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);

    mon.request_event(Event::ImmediateStop);
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingImmediate);
}

#[tokio::test]
async fn shrink_drives_a_running_worker_to_stopping_graceful() {
    let config = ConfigBuilder::default().worker_type(WorkerType::Embedded).build();
    let (mut mon, _handles) = monitor(WorkerType::Embedded, &config);

    let t0 = Instant::now();
    mon.tick(t0, &config, true).await.unwrap();
    mon.tick(t0, &config, true).await.unwrap();
    assert_eq!(mon.state(), WorkerState::Running);

    mon.tick(t0, &config, false).await.unwrap();
    assert_eq!(mon.state(), WorkerState::StoppingGraceful);
}
