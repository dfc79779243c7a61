// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::config::{Config, ConfigBuilder};
use crate::worker::WorkerId;
use std::time::Duration;

/// A [`Config`] tuned for fast, deterministic tests: tiny intervals, a
/// single worker, no randomized respawn jitter.
pub fn fast_test_config() -> Config {
    ConfigBuilder::default()
        .workers(1)
        .start_worker_delay(Duration::ZERO)
        .start_worker_delay_rand(0.0)
        .worker_heartbeat_interval(Duration::from_millis(10))
        .worker_heartbeat_timeout(Duration::from_millis(200))
        .worker_graceful_kill_interval(Duration::from_millis(20))
        .worker_graceful_kill_interval_increment(Duration::from_millis(10))
        .worker_immediate_kill_interval(Duration::from_millis(20))
        .worker_immediate_kill_interval_increment(Duration::from_millis(10))
        .build()
}

/// The dense worker IDs `0..n`, in order, as the server would assign them.
pub fn worker_ids(n: u32) -> Vec<WorkerId> {
    (0..n).map(WorkerId::new).collect()
}

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::config::KillTimeout;
    use crate::worker::WorkerState;
    use proptest::prelude::*;
    use std::time::Duration;

    pub fn arb_worker_state() -> impl Strategy<Value = WorkerState> {
        prop_oneof![
            Just(WorkerState::Idle),
            Just(WorkerState::Starting),
            Just(WorkerState::Running),
            Just(WorkerState::StoppingGraceful),
            Just(WorkerState::StoppingImmediate),
            Just(WorkerState::StoppingForced),
            Just(WorkerState::Finished),
        ]
    }

    pub fn arb_kill_timeout() -> impl Strategy<Value = KillTimeout> {
        prop_oneof![
            Just(KillTimeout::Never),
            (0u64..10_000).prop_map(|s| KillTimeout::After(Duration::from_secs(s))),
        ]
    }
}
