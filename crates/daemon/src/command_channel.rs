// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command channel: the supervisor's pipe to its server child (§3 "Server
//! descriptor", §4.6), used to forward signal-derived events across the
//! process boundary.
//!
//! Built on the same named-FIFO idiom as [`crate::heartbeat`]'s process
//! backend channel, for the same reason: an anonymous pipe's fd cannot
//! cross a re-exec without `unsafe` `pre_exec`/fork plumbing, which the
//! workspace forbids. One byte per event is written; the reader drains a
//! whole batch non-blockingly and maps each byte back to an [`Event`].

use std::io;
use std::path::{Path, PathBuf};

use tokio::net::unix::pipe;
use warden_core::Event;

fn to_byte(event: Event) -> u8 {
    match event {
        Event::GracefulStop => 1,
        Event::ImmediateStop => 2,
        Event::GracefulRestart => 3,
        Event::ImmediateRestart => 4,
        Event::Reload => 5,
        Event::Detach => 6,
        Event::Dump => 7,
    }
}

fn from_byte(byte: u8) -> Option<Event> {
    match byte {
        1 => Some(Event::GracefulStop),
        2 => Some(Event::ImmediateStop),
        3 => Some(Event::GracefulRestart),
        4 => Some(Event::ImmediateRestart),
        5 => Some(Event::Reload),
        6 => Some(Event::Detach),
        7 => Some(Event::Dump),
        _ => None,
    }
}

/// Supervisor-side handle: forwards events to the server child.
#[derive(Debug)]
pub struct CommandWriter {
    sender: pipe::Sender,
}

impl CommandWriter {
    pub async fn send(&self, event: Event) -> io::Result<()> {
        let byte = [to_byte(event)];
        loop {
            self.sender.writable().await?;
            match self.sender.try_write(&byte) {
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Server-side handle: drains pending commands non-blockingly.
#[derive(Debug)]
pub struct CommandReader {
    receiver: pipe::Receiver,
}

impl CommandReader {
    pub fn drain(&self) -> io::Result<Vec<Event>> {
        let mut buf = [0u8; 64];
        let mut events = Vec::new();
        loop {
            match self.receiver.try_read(&mut buf) {
                Ok(0) => return Ok(events),
                Ok(n) => events.extend(buf[..n].iter().copied().filter_map(|b| from_byte(b))),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(events),
                Err(e) => return Err(e),
            }
        }
    }
}

pub fn path(run_dir: &Path, server_generation: u64) -> PathBuf {
    run_dir.join(format!("command-{server_generation}.fifo"))
}

/// Create the FIFO and open the supervisor's write end.
pub fn writer(path: &Path) -> io::Result<CommandWriter> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    nix::unistd::mkfifo(path, nix::sys::stat::Mode::from_bits_truncate(0o600)).map_err(io::Error::from)?;
    let sender = pipe::OpenOptions::new().open_sender(path)?;
    Ok(CommandWriter { sender })
}

/// Open the server child's non-blocking read end. Called from the child
/// after the supervisor has created the FIFO.
pub fn reader(path: &Path) -> io::Result<CommandReader> {
    let receiver = pipe::OpenOptions::new().open_receiver(path)?;
    Ok(CommandReader { receiver })
}

#[cfg(test)]
#[path = "command_channel_tests.rs"]
mod tests;
