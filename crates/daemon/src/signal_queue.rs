// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal queue (C3): a coalescing FIFO of [`Event`]s.
//!
//! Signal handlers run on whatever thread delivers the OS signal and must
//! not block or allocate unboundedly, so the queue only ever holds at most
//! one pending occurrence of each event kind. A second `push` for an event
//! kind that is already queued is a no-op; the caller finds out via the
//! `bool` return so it can log the coalescing decision.

use std::collections::VecDeque;

use parking_lot::Mutex;
use warden_core::Event;

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<Event>,
    pending: [bool; Event::COUNT],
}

/// Cloneable handle onto a shared, coalescing event queue.
#[derive(Debug, Clone, Default)]
pub struct SignalQueue {
    inner: std::sync::Arc<Mutex<Inner>>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `event`. Returns `true` if it was newly enqueued, `false`
    /// if an occurrence of the same kind was already pending.
    pub fn push(&self, event: Event) -> bool {
        let mut inner = self.inner.lock();
        let slot = event.slot();
        if inner.pending[slot] {
            return false;
        }
        inner.pending[slot] = true;
        inner.queue.push_back(event);
        true
    }

    /// Dequeue the oldest pending event, if any, in enqueue order.
    pub fn pop(&self) -> Option<Event> {
        let mut inner = self.inner.lock();
        let event = inner.queue.pop_front()?;
        inner.pending[event.slot()] = false;
        Some(event)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "signal_queue_tests.rs"]
mod tests;
