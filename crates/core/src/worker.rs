// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity and lifecycle state.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Dense identifier for a worker slot, `0 <= worker_id < workers`.
///
/// Unlike most identifiers in this crate, worker IDs are not random: the
/// server owns exactly `config.workers` slots and assigns IDs `0..workers`
/// at construction. An ID is stable for the lifetime of the server even as
/// the runtime handle behind it is started and stopped repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl WorkerId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Stage of an in-progress worker shutdown.
///
/// Mirrors `WorkerState::Stopping*` but as a plain index so escalation
/// math (`base_interval[stage]`, `increment[stage]`) can index an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum KillStage {
    Graceful = 0,
    Immediate = 1,
    Forced = 2,
}

impl KillStage {
    pub const fn index(self) -> usize {
        self as u8 as usize
    }
}

/// State of a single worker-monitor's state machine (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Idle,
    Starting,
    Running,
    StoppingGraceful,
    StoppingImmediate,
    StoppingForced,
    Finished,
}

crate::simple_display! {
    WorkerState {
        Idle => "idle",
        Starting => "starting",
        Running => "running",
        StoppingGraceful => "stopping_graceful",
        StoppingImmediate => "stopping_immediate",
        StoppingForced => "stopping_forced",
        Finished => "finished",
    }
}

impl WorkerState {
    /// `true` for any of the three `Stopping*` states.
    pub fn is_stopping(self) -> bool {
        matches!(self, Self::StoppingGraceful | Self::StoppingImmediate | Self::StoppingForced)
    }

    /// `true` once the worker has a live runtime handle worth tracking.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Running) || self.is_stopping()
    }

    /// The [`KillStage`] a `Stopping*` state corresponds to, if any.
    pub fn kill_stage(self) -> Option<KillStage> {
        match self {
            Self::StoppingGraceful => Some(KillStage::Graceful),
            Self::StoppingImmediate => Some(KillStage::Immediate),
            Self::StoppingForced => Some(KillStage::Forced),
            _ => None,
        }
    }
}

/// Bookkeeping timestamps for one worker slot's escalation/respawn schedule.
///
/// Owned by the server loop, not by the worker itself; the worker never
/// observes this struct.
#[derive(Debug, Clone)]
pub struct WorkerTiming {
    pub last_heartbeat_at: Option<Instant>,
    pub stage_entered_at: Instant,
    pub next_signal_at: Instant,
    pub times_sent_in_stage: u32,
    pub next_start_at: Instant,
}

impl WorkerTiming {
    pub fn new(now: Instant) -> Self {
        Self {
            last_heartbeat_at: None,
            stage_entered_at: now,
            next_signal_at: now,
            times_sent_in_stage: 0,
            next_start_at: now,
        }
    }

    /// Reset stage bookkeeping on entry to a new `Stopping*` stage.
    pub fn enter_stage(&mut self, now: Instant) {
        self.stage_entered_at = now;
        self.next_signal_at = now;
        self.times_sent_in_stage = 0;
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
