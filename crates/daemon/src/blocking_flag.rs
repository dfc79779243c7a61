// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking flag (C2): a thread-safe boolean that callers can wait on.
//!
//! Used by the `thread` worker backend to signal stop requests into a
//! worker closure that polls it between units of work, and by a few
//! internal handshakes (server-ready, detach-complete) that need a
//! waiter to block without busy-looping.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct Inner {
    set: Mutex<bool>,
    condvar: Condvar,
}

/// Cloneable handle onto a shared boolean flag with wait support.
#[derive(Debug, Clone, Default)]
pub struct BlockingFlag {
    inner: Arc<Inner>,
}

impl BlockingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        *self.inner.set.lock() = true;
        self.inner.condvar.notify_all();
    }

    pub fn reset(&self) {
        *self.inner.set.lock() = false;
        self.inner.condvar.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.inner.set.lock()
    }

    /// Block until the flag is set, or `timeout` elapses. Returns whether
    /// the flag was observed set.
    pub fn wait_for_set(&self, timeout: Duration) -> bool {
        let mut guard = self.inner.set.lock();
        if *guard {
            return true;
        }
        self.inner.condvar.wait_for(&mut guard, timeout);
        *guard
    }

    /// Block until the flag is reset, or `timeout` elapses. Returns whether
    /// the flag was observed reset.
    pub fn wait_for_reset(&self, timeout: Duration) -> bool {
        let mut guard = self.inner.set.lock();
        if !*guard {
            return true;
        }
        self.inner.condvar.wait_for(&mut guard, timeout);
        !*guard
    }
}

#[cfg(test)]
#[path = "blocking_flag_tests.rs"]
mod tests;
