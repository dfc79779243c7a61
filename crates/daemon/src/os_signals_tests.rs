// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use nix::sys::signal::{raise, Signal as NixSignal};
use warden_core::Signal;

use super::*;

#[tokio::test]
async fn recv_translates_sigterm() {
    let mut signals = OsSignals::install().unwrap();
    tokio::spawn(async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        raise(NixSignal::SIGTERM).unwrap();
    });
    assert_eq!(signals.recv().await, Signal::Term);
}

#[tokio::test]
async fn recv_translates_sigusr2() {
    let mut signals = OsSignals::install().unwrap();
    tokio::spawn(async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        raise(NixSignal::SIGUSR2).unwrap();
    });
    assert_eq!(signals.recv().await, Signal::Usr2);
}

#[tokio::test]
async fn recv_translates_sigcont() {
    let mut signals = OsSignals::install().unwrap();
    tokio::spawn(async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        raise(NixSignal::SIGCONT).unwrap();
    });
    assert_eq!(signals.recv().await, Signal::Cont);
}
