// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dump hook (C12): a `CONT`-triggered diagnostic snapshot.
//!
//! Content is intentionally minimal (§4.12): the state of every descriptor
//! the owning loop holds, as plain text. The one contract that matters is
//! that this never panics the caller's loop — every fallible step here is
//! logged and swallowed.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

use tracing::warn;

/// Anything that can describe its own state machines for a dump.
pub trait Dumpable {
    /// One line per descriptor this owner holds, e.g. `worker-0: running`.
    fn describe(&self) -> Vec<String>;

    /// A short name for the section header (`"server"`, `"supervisor"`).
    fn role(&self) -> &'static str;
}

/// Default dump file path for `pid` (§6 persisted state).
pub fn dump_path(pid: u32) -> PathBuf {
    PathBuf::from(format!("/tmp/sigdump-{pid}.log"))
}

/// Write a diagnostic dump for `owner` to [`dump_path`]. Never panics;
/// failures are logged at `warn` and otherwise ignored, since a dump is a
/// best-effort diagnostic aid, not a correctness requirement.
pub fn write_dump(pid: u32, owner: &dyn Dumpable) {
    let mut body = String::new();
    let _ = writeln!(body, "# {} dump (pid {pid})", owner.role());
    for line in owner.describe() {
        let _ = writeln!(body, "{line}");
    }

    let path = dump_path(pid);
    match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(mut file) => {
            if let Err(err) = file.write_all(body.as_bytes()) {
                warn!(?err, path = %path.display(), "failed writing diagnostic dump");
            }
        }
        Err(err) => warn!(?err, path = %path.display(), "failed opening diagnostic dump file"),
    }
}

#[cfg(test)]
#[path = "dump_tests.rs"]
mod tests;
