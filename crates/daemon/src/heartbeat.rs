// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat channel (C1): a one-byte-at-a-time liveness signal from a
//! `process`-backend worker to its monitor.
//!
//! Only the `process` backend uses this: it runs as a real OS child, so
//! its monitor has no cheaper way to observe liveness than a pipe. It
//! cannot inherit an anonymous pipe without an `unsafe` fork-and-exec
//! dance, so it instead rendezvous on a named FIFO created next to the
//! worker's run directory; the child process writes to it with
//! [`write_beat_blocking`], which is plain, synchronous, and has no
//! dependency on this crate's async runtime. `embedded` and `thread`
//! workers are self-certified instead (`WorkerType::uses_heartbeat_pipe`
//! is `false` for both): the monitor treats "task not finished"/"thread
//! running" as fresh, with no pipe of any kind involved.

use std::io;
use std::path::{Path, PathBuf};

use tokio::net::unix::pipe;

/// Monitor-side handle: polls for a pending heartbeat without blocking.
#[derive(Debug)]
pub struct HeartbeatReader {
    receiver: pipe::Receiver,
}

impl HeartbeatReader {
    /// Drain any pending heartbeat bytes. Returns `true` if at least one
    /// was observed since the last poll.
    pub fn poll_beat(&self) -> io::Result<bool> {
        let mut buf = [0u8; 64];
        let mut seen = false;
        loop {
            match self.receiver.try_read(&mut buf) {
                Ok(0) => return Ok(seen),
                Ok(_) => seen = true,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(seen),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Create the FIFO a `process`-backend worker will write heartbeats to, and
/// open the monitor's non-blocking read end.
pub fn fifo_reader(path: &Path) -> io::Result<HeartbeatReader> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    nix::unistd::mkfifo(path, nix::sys::stat::Mode::from_bits_truncate(0o600))
        .map_err(io::Error::from)?;
    let receiver = pipe::OpenOptions::new().open_receiver(path)?;
    Ok(HeartbeatReader { receiver })
}

/// Default FIFO path for a worker's heartbeat channel under `run_dir`.
pub fn fifo_path(run_dir: &Path, worker_index: u32) -> PathBuf {
    run_dir.join(format!("heartbeat-{worker_index}.fifo"))
}

/// Blocking write of one heartbeat byte, for use from a worker process's own
/// `main` (outside of any async runtime). Opens, writes, and closes; FIFO
/// semantics mean this never blocks once the monitor's read end exists.
pub fn write_beat_blocking(path: &Path) -> io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new().write(true).open(path)?;
    file.write_all(&[1u8])
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
