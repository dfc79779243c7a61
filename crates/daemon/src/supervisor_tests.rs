// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning a real server child here would re-exec the test binary itself
//! (the supervisor launches `current_exe()` with `WARDEN_ROLE=server`), so
//! these tests cover the guard logic around detach/forwarding that doesn't
//! require an actual child; the detach/restart protocol end-to-end is
//! exercised by the reference binary, not the unit suite.

use warden_core::Config;

use super::*;

fn supervisor(config: Config) -> Supervisor {
    Supervisor::new(config, std::env::temp_dir(), SignalQueue::new())
}

#[test]
fn starts_in_init_state() {
    let sup = supervisor(Config::default());
    assert_eq!(sup.state(), SupervisorState::Init);
    assert!(!sup.is_exited());
}

#[tokio::test]
async fn detach_with_no_current_server_is_a_silent_no_op() {
    let mut sup = supervisor(Config::default());
    sup.begin_detach().await;
    assert_eq!(sup.state(), SupervisorState::Init);
    assert!(sup.detaching.is_none());
}

#[tokio::test]
async fn detach_disabled_in_config_is_ignored() {
    let mut config = Config::default();
    config.enable_detach = false;
    let mut sup = supervisor(config);
    sup.begin_detach().await;
    assert_eq!(sup.state(), SupervisorState::Init);
}

#[tokio::test]
async fn forward_with_no_current_server_does_not_panic() {
    let sup = supervisor(Config::default());
    sup.forward(Event::Reload).await;
}

#[tokio::test]
async fn dump_event_does_not_panic_without_a_current_server() {
    let mut sup = supervisor(Config::default());
    sup.signals.push(Event::Dump);
    sup.tick().await.unwrap();
    let path = crate::dump::dump_path(std::process::id());
    assert!(path.exists());
    std::fs::remove_file(path).ok();
}
