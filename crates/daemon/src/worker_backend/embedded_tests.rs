// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use warden_core::Config;

use super::*;
use crate::hooks::ServerHandle;

struct WaitForStop;

#[async_trait]
impl WorkerHooks for WaitForStop {
    async fn run(&self, _ctx: &Context, stop: BlockingFlag) -> Result<(), crate::hooks::WorkerError> {
        while !stop.wait_for_set(Duration::from_millis(10)) {}
        Ok(())
    }
}

fn test_ctx() -> Context {
    let server = ServerHandle::new(Arc::new(Config::default()));
    Context::for_worker(server, tracing::Span::none(), warden_core::WorkerId::new(0))
}

#[tokio::test]
async fn spawn_then_signal_term_stops_the_task() {
    let mut backend = EmbeddedBackend::new();
    backend.spawn(test_ctx(), Arc::new(WaitForStop)).await.unwrap();
    assert!(backend.is_alive());
    assert_eq!(backend.signal(Signal::Term), SignalOutcome::Sent);
    assert!(backend.join(Duration::from_secs(2)).await);
    assert!(!backend.is_alive());
}

#[tokio::test]
async fn unsupported_signals_are_reported() {
    let mut backend = EmbeddedBackend::new();
    backend.spawn(test_ctx(), Arc::new(WaitForStop)).await.unwrap();
    assert_eq!(backend.signal(Signal::Quit), SignalOutcome::Unsupported);
    assert_eq!(backend.force_kill(), SignalOutcome::Unsupported);
    backend.signal(Signal::Term);
    backend.join(Duration::from_secs(2)).await;
}

#[tokio::test]
async fn join_times_out_while_task_still_running() {
    let mut backend = EmbeddedBackend::new();
    backend.spawn(test_ctx(), Arc::new(WaitForStop)).await.unwrap();
    assert!(!backend.join(Duration::from_millis(20)).await);
    backend.signal(Signal::Term);
    assert!(backend.join(Duration::from_secs(2)).await);
}
