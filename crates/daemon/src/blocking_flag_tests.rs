// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::thread;
use std::time::Duration;

use super::*;

#[test]
fn starts_reset() {
    let flag = BlockingFlag::new();
    assert!(!flag.is_set());
}

#[test]
fn set_and_reset_round_trip() {
    let flag = BlockingFlag::new();
    flag.set();
    assert!(flag.is_set());
    flag.reset();
    assert!(!flag.is_set());
}

#[test]
fn wait_for_set_returns_immediately_when_already_set() {
    let flag = BlockingFlag::new();
    flag.set();
    assert!(flag.wait_for_set(Duration::from_millis(1)));
}

#[test]
fn wait_for_set_times_out_when_never_set() {
    let flag = BlockingFlag::new();
    assert!(!flag.wait_for_set(Duration::from_millis(20)));
}

#[test]
fn wait_for_set_wakes_on_another_thread_setting_it() {
    let flag = BlockingFlag::new();
    let setter = flag.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        setter.set();
    });
    assert!(flag.wait_for_set(Duration::from_secs(5)));
    handle.join().unwrap();
}

#[test]
fn wait_for_reset_wakes_on_another_thread_resetting_it() {
    let flag = BlockingFlag::new();
    flag.set();
    let resetter = flag.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        resetter.reset();
    });
    assert!(flag.wait_for_reset(Duration::from_secs(5)));
    handle.join().unwrap();
}
