// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread backend: an in-process OS thread running its own small
//! current-thread runtime. `signal(TERM)` sets the worker's blocking flag;
//! anything else is unsupported (§4.8). Heartbeat is self-certified: the
//! monitor treats "thread alive" as "heartbeat fresh".

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{error, warn};
use warden_core::Signal;

use super::{SignalOutcome, WorkerBackend};
use crate::blocking_flag::BlockingFlag;
use crate::hooks::{Context, WorkerHooks};

pub struct ThreadBackend {
    stop: BlockingFlag,
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for ThreadBackend {
    fn default() -> Self {
        Self { stop: BlockingFlag::new(), running: Arc::new(AtomicBool::new(false)), handle: None }
    }
}

impl ThreadBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}

#[async_trait]
impl WorkerBackend for ThreadBackend {
    async fn spawn(&mut self, ctx: Context, hooks: Arc<dyn WorkerHooks>) -> io::Result<()> {
        self.stop.reset();
        let stop = self.stop.clone();
        let running = Arc::new(AtomicBool::new(true));
        self.running = running.clone();

        let name = format!("warden-worker-{}", ctx.worker_id().map_or(u32::MAX, |id| id.0));
        let handle = std::thread::Builder::new().name(name).spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "failed to build worker thread runtime");
                    running.store(false, Ordering::SeqCst);
                    return;
                }
            };
            if let Err(e) = rt.block_on(hooks.run(&ctx, stop)) {
                warn!(worker = ?ctx.worker_id(), error = %e, "thread worker run() returned an error");
            }
            running.store(false, Ordering::SeqCst);
        })?;
        self.handle = Some(handle);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        if self.running.load(Ordering::SeqCst) {
            true
        } else {
            self.reap();
            false
        }
    }

    fn poll_heartbeat(&mut self) -> bool {
        self.is_alive()
    }

    fn signal(&mut self, signal: Signal) -> SignalOutcome {
        match signal {
            Signal::Term => {
                self.stop.set();
                SignalOutcome::Sent
            }
            _ => SignalOutcome::Unsupported,
        }
    }

    async fn join(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.running.load(Ordering::SeqCst) {
                self.reap();
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn force_kill(&mut self) -> SignalOutcome {
        warn!("force_kill is unsupported on the thread worker backend");
        SignalOutcome::Unsupported
    }
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod tests;
