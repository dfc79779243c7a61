// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-core: domain types for the warden supervisor/server/worker
//! engine — configuration, identifiers, and the state-machine vocabulary
//! shared by the `warden-daemon` crate. Contains no I/O and no async
//! runtime dependency; every type here is plain, `Send + Sync`, and cheap
//! to construct in a unit test.

pub mod macros;

pub mod clock;
pub mod config;
pub mod signal;
pub mod worker;
pub mod worker_type;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError, ConfigLoader, KillTimeout, LogLevel};
#[cfg(any(test, feature = "test-support"))]
pub use config::ConfigBuilder;
pub use signal::{server_signal_to_event, Event, Signal};
pub use worker::{KillStage, WorkerId, WorkerState, WorkerTiming};
pub use worker_type::WorkerType;
