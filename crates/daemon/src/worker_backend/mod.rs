// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-type strategy (C8): one interface over the three backends a
//! worker slot can run as.

mod embedded;
mod process;
mod thread;

pub use embedded::EmbeddedBackend;
pub use process::ProcessBackend;
pub use thread::ThreadBackend;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use warden_core::Signal;

use crate::hooks::{Context, WorkerHooks};

/// Result of attempting to deliver a signal to a worker's runtime handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The signal (or its backend-appropriate substitute) was delivered.
    Sent,
    /// This backend cannot express the signal; logged at `warn` by the
    /// caller and otherwise dropped (§7 kind 6).
    Unsupported,
}

/// Spawn/join/kill strategy for one worker's runtime handle (§4.8).
///
/// Implementations own at most one live runtime handle at a time; calling
/// `spawn` while one is already live is a logic error the monitor never
/// performs (enforced by the state machine, §3 invariants).
#[async_trait]
pub trait WorkerBackend: Send {
    /// Start the worker's runtime handle. Returns once the handle is
    /// launched, not once it has reached `Running` — the monitor decides
    /// that separately (heartbeat, or immediately for thread/embedded).
    async fn spawn(&mut self, ctx: Context, hooks: Arc<dyn WorkerHooks>) -> io::Result<()>;

    /// Non-blocking check for whether the runtime handle is still alive.
    /// Reaps the handle's exit status as a side effect once it has exited.
    fn is_alive(&mut self) -> bool;

    /// Poll for a pending heartbeat without blocking. Backends without an
    /// independent liveness channel (`thread`, `embedded`) self-certify:
    /// they return `true` exactly while `is_alive()` would.
    fn poll_heartbeat(&mut self) -> bool;

    /// Deliver a stage-appropriate signal.
    fn signal(&mut self, signal: Signal) -> SignalOutcome;

    /// Block (cooperatively) until the handle exits or `timeout` elapses.
    /// Returns `true` if it exited within the deadline.
    async fn join(&mut self, timeout: Duration) -> bool;

    /// Unblockable termination. No-op (logged `warn` by the caller) on
    /// backends that cannot express it.
    fn force_kill(&mut self) -> SignalOutcome;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
