// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded backend: the worker's `run` future is polled directly on the
//! server's own runtime. No thread, no process, no independent liveness —
//! "alive" means "the task hasn't finished" (§4.8).

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::warn;
use warden_core::Signal;

use super::{SignalOutcome, WorkerBackend};
use crate::blocking_flag::BlockingFlag;
use crate::hooks::{Context, WorkerHooks};

#[derive(Default)]
pub struct EmbeddedBackend {
    stop: BlockingFlag,
    handle: Option<JoinHandle<()>>,
}

impl EmbeddedBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkerBackend for EmbeddedBackend {
    async fn spawn(&mut self, ctx: Context, hooks: Arc<dyn WorkerHooks>) -> io::Result<()> {
        self.stop.reset();
        let stop = self.stop.clone();
        self.handle = Some(tokio::spawn(async move {
            if let Err(e) = hooks.run(&ctx, stop).await {
                warn!(worker = ?ctx.worker_id(), error = %e, "embedded worker run() returned an error");
            }
        }));
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        match &self.handle {
            Some(h) if !h.is_finished() => true,
            Some(_) => {
                self.handle = None;
                false
            }
            None => false,
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
        let Some(handle) = self.handle.as_mut() else { return true };
        match tokio::time::timeout(timeout, handle).await {
            Ok(_) => {
                self.handle = None;
                true
            }
            Err(_elapsed) => false,
        }
    }

    fn force_kill(&mut self) -> SignalOutcome {
        SignalOutcome::Unsupported
    }
}

#[cfg(test)]
#[path = "embedded_tests.rs"]
mod tests;
