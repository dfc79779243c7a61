// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Symbolic signal events (§4.3): the vocabulary the signal queue deals in.
//!
//! The core never touches `libc` signal numbers directly outside the daemon
//! crate's queue implementation; everywhere else, including every test, only
//! [`Signal`] and [`Event`] are visible.

use serde::{Deserialize, Serialize};

/// A POSIX signal the daemon recognizes, independent of any particular
/// signal-handling crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Term,
    Quit,
    Usr1,
    Hup,
    Usr2,
    Int,
    Cont,
    /// Unblockable kill; never delivered through the queue, only sent.
    Kill,
}

crate::simple_display! {
    Signal {
        Term => "TERM",
        Quit => "QUIT",
        Usr1 => "USR1",
        Hup => "HUP",
        Usr2 => "USR2",
        Int => "INT",
        Cont => "CONT",
        Kill => "KILL",
    }
}

/// A symbolic event produced by translating a [`Signal`] (§4.3 table) or by
/// an internal escalation decision. The signal queue coalesces identical
/// pending events of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    GracefulStop,
    ImmediateStop,
    GracefulRestart,
    ImmediateRestart,
    Reload,
    Detach,
    Dump,
}

crate::simple_display! {
    Event {
        GracefulStop => "graceful_stop",
        ImmediateStop => "immediate_stop",
        GracefulRestart => "graceful_restart",
        ImmediateRestart => "immediate_restart",
        Reload => "reload",
        Detach => "detach",
        Dump => "dump",
    }
}

impl Event {
    /// Index into a small coalescing table; stable across process restarts
    /// only in the sense that it doesn't change within a build.
    pub const COUNT: usize = 7;

    pub const fn slot(self) -> usize {
        match self {
            Self::GracefulStop => 0,
            Self::ImmediateStop => 1,
            Self::GracefulRestart => 2,
            Self::ImmediateRestart => 3,
            Self::Reload => 4,
            Self::Detach => 5,
            Self::Dump => 6,
        }
    }
}

/// Map an incoming [`Signal`] to the [`Event`] it produces in the Server
/// process (§4.3 table).
///
/// `QUIT` and `HUP` only translate for the `process` worker backend; other
/// backends cannot act on them (§4.8) so the signal is dropped (logged at
/// `warn` by the caller). `INT` maps to [`Event::Detach`] when detach is
/// enabled, else [`Event::GracefulStop`].
pub fn server_signal_to_event(signal: Signal, process_backend: bool, detach_enabled: bool) -> Option<Event> {
    match signal {
        Signal::Term => Some(Event::GracefulStop),
        Signal::Quit => process_backend.then_some(Event::ImmediateStop),
        Signal::Usr1 => Some(Event::GracefulRestart),
        Signal::Hup => process_backend.then_some(Event::ImmediateRestart),
        Signal::Usr2 => Some(Event::Reload),
        Signal::Int => {
            Some(if detach_enabled { Event::Detach } else { Event::GracefulStop })
        }
        Signal::Cont => Some(Event::Dump),
        Signal::Kill => None,
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
