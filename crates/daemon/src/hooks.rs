// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle hook dispatch (C7): the capability traits an embedding
//! application implements, and the `Context` threaded into every call.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::Span;
use warden_core::{Config, WorkerId};

use crate::blocking_flag::BlockingFlag;

/// Error a worker's `run` hook can fail with. The monitor logs it and
/// treats the worker as crashed (§7 kind 5); it never propagates further.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct WorkerError(pub String);

impl WorkerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Shared, mutable-by-reload state a [`ServerHandle`] gives hooks access to.
#[derive(Debug)]
struct ServerShared {
    config: RwLock<Arc<Config>>,
}

/// Cheap, cloneable handle back into the owning server, given to every hook
/// via [`Context::server`]. Workers use it to read the live configuration
/// snapshot; it carries no capability to mutate worker state directly, to
/// keep the loop's state-machine ownership single-threaded (§5).
#[derive(Debug, Clone)]
pub struct ServerHandle {
    shared: Arc<ServerShared>,
}

impl ServerHandle {
    pub fn new(config: Arc<Config>) -> Self {
        Self { shared: Arc::new(ServerShared { config: RwLock::new(config) }) }
    }

    pub fn config(&self) -> Arc<Config> {
        self.shared.config.read().clone()
    }

    pub(crate) fn set_config(&self, config: Arc<Config>) {
        *self.shared.config.write() = config;
    }
}

/// Context injected into every hook call (§4.7, §6 user contract).
#[derive(Debug, Clone)]
pub struct Context {
    server: ServerHandle,
    span: Span,
    worker_id: Option<WorkerId>,
}

impl Context {
    pub fn for_server(server: ServerHandle, span: Span) -> Self {
        Self { server, span, worker_id: None }
    }

    pub fn for_worker(server: ServerHandle, span: Span, worker_id: WorkerId) -> Self {
        Self { server, span, worker_id: Some(worker_id) }
    }

    pub fn config(&self) -> Arc<Config> {
        self.server.config()
    }

    pub fn server(&self) -> &ServerHandle {
        &self.server
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// `None` for server-level hooks; `Some` for worker-level hooks.
    pub fn worker_id(&self) -> Option<WorkerId> {
        self.worker_id
    }
}

/// Hooks invoked on the server process (§4.7). All methods default to
/// no-ops, matching the user contract that a `ServerHooks` implementation
/// is optional.
#[async_trait]
pub trait ServerHooks: Send + Sync {
    async fn initialize(&self, _ctx: &Context) {}
    async fn before_run(&self, _ctx: &Context) {}
    async fn after_run(&self, _ctx: &Context) {}
    async fn reload_config(&self, _ctx: &Context) {}
}

/// No-op implementation used when an application supplies none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopServerHooks;

impl ServerHooks for NoopServerHooks {}

/// Hooks invoked for a single worker (§4.7). `run` is the worker's main
/// body and must be meaningful; `stop` defaults to a no-op because the
/// `process` backend drives its cooperative stop entirely through OS
/// signals, but `thread`/`embedded` implementations must override it to
/// observe their blocking flag.
#[async_trait]
pub trait WorkerHooks: Send + Sync {
    async fn initialize(&self, _ctx: &Context) {}
    async fn before_fork(&self, _ctx: &Context) {}

    async fn run(&self, ctx: &Context, stop: BlockingFlag) -> Result<(), WorkerError>;

    fn stop(&self, _ctx: &Context) {}

    async fn reload(&self, _ctx: &Context) {}
    async fn after_start(&self, _ctx: &Context) {}
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
