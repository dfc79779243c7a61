// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-daemon: the supervisor/server/worker-monitor runtime built on
//! `warden-core`'s domain types — signal handling, heartbeats, lifecycle
//! hooks, the worker-type backends, and the process-environment and
//! logging collaborators that turn a `WorkerHooks` implementation into a
//! production daemon.

pub mod blocking_flag;
pub mod command_channel;
pub mod config_loader;
pub mod dump;
pub mod env;
pub mod error;
pub mod heartbeat;
pub mod hooks;
pub mod logging;
pub mod monitor;
pub mod os_signals;
pub mod process_env;
pub mod server;
pub mod signal_queue;
pub mod supervisor;
pub mod worker_backend;

pub use config_loader::{StaticConfigLoader, TomlConfigLoader};
pub use error::DaemonError;
pub use hooks::{Context, NoopServerHooks, ServerHandle, ServerHooks, WorkerError, WorkerHooks};
pub use monitor::WorkerMonitor;
pub use os_signals::OsSignals;
pub use process_env::{DefaultProcessEnvironment, NoopProcessEnvironment, ProcessEnvError, ProcessEnvironment};
pub use server::{Server, ServerState};
pub use signal_queue::SignalQueue;
pub use supervisor::{Supervisor, SupervisorState};
