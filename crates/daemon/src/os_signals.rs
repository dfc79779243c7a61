// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registers the seven POSIX signals the daemon recognizes (§4.3) as
//! tokio signal streams and exposes a single `recv` future over all of
//! them, translating each arrival into a [`warden_core::Signal`].

use std::io;

use tokio::signal::unix::{signal, Signal as UnixSignal, SignalKind};
use warden_core::Signal;

pub struct OsSignals {
    term: UnixSignal,
    quit: UnixSignal,
    usr1: UnixSignal,
    hup: UnixSignal,
    usr2: UnixSignal,
    int: UnixSignal,
    cont: UnixSignal,
}

impl OsSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
            usr1: signal(SignalKind::user_defined1())?,
            hup: signal(SignalKind::hangup())?,
            usr2: signal(SignalKind::user_defined2())?,
            int: signal(SignalKind::interrupt())?,
            cont: signal(SignalKind::from_raw(libc_sigcont()))?,
        })
    }

    /// Wait for the next signal of interest.
    pub async fn recv(&mut self) -> Signal {
        tokio::select! {
            _ = self.term.recv() => Signal::Term,
            _ = self.quit.recv() => Signal::Quit,
            _ = self.usr1.recv() => Signal::Usr1,
            _ = self.hup.recv() => Signal::Hup,
            _ = self.usr2.recv() => Signal::Usr2,
            _ = self.int.recv() => Signal::Int,
            _ = self.cont.recv() => Signal::Cont,
        }
    }
}

/// `SIGCONT`'s numeric value. `tokio::signal::unix::SignalKind` has no
/// named constructor for it, unlike the other six.
fn libc_sigcont() -> std::os::raw::c_int {
    nix::sys::signal::Signal::SIGCONT as std::os::raw::c_int
}

#[cfg(test)]
#[path = "os_signals_tests.rs"]
mod tests;
