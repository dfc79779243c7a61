// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-type strategy (§4.8): the capabilities each backend offers.

use serde::{Deserialize, Serialize};

/// Which backend a worker slot is launched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    /// Runs inside the server's own execution context; no independent
    /// liveness path, no OS signals.
    Embedded,
    /// Runs as an in-process thread; `stop` is delivered via the blocking
    /// flag, heartbeat is self-certified.
    Thread,
    /// Runs as a real OS child process; full signal escalation and a
    /// pipe-based heartbeat.
    Process,
}

impl Default for WorkerType {
    fn default() -> Self {
        Self::Embedded
    }
}

crate::simple_display! {
    WorkerType {
        Embedded => "embedded",
        Thread => "thread",
        Process => "process",
    }
}

impl WorkerType {
    /// Whether this backend can be sent a real OS signal (TERM/QUIT/KILL).
    pub fn supports_os_signal(self) -> bool {
        matches!(self, Self::Process)
    }

    /// Whether this backend supports an unblockable forced kill.
    ///
    /// `thread` and `embedded` workers cannot be forcibly terminated; the
    /// monitor logs this limitation instead of attempting it (§4.8).
    pub fn supports_forced_kill(self) -> bool {
        matches!(self, Self::Process)
    }

    /// Whether liveness is tracked via the heartbeat pipe (true) or
    /// self-certified by the monitor every tick (false).
    pub fn uses_heartbeat_pipe(self) -> bool {
        matches!(self, Self::Process)
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "embedded" => Some(Self::Embedded),
            "thread" => Some(Self::Thread),
            "process" => Some(Self::Process),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "worker_type_tests.rs"]
mod tests;
