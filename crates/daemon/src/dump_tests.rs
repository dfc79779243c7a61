// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct FakeOwner;

impl Dumpable for FakeOwner {
    fn describe(&self) -> Vec<String> {
        vec!["worker-0: running".into(), "worker-1: idle".into()]
    }

    fn role(&self) -> &'static str {
        "server"
    }
}

#[test]
fn writes_a_readable_dump_file() {
    let pid = std::process::id();
    write_dump(pid, &FakeOwner);
    let contents = std::fs::read_to_string(dump_path(pid)).unwrap();
    assert!(contents.contains("server dump"));
    assert!(contents.contains("worker-0: running"));
    std::fs::remove_file(dump_path(pid)).ok();
}

#[test]
fn dump_path_is_keyed_by_pid() {
    assert_eq!(dump_path(42).to_str().unwrap(), "/tmp/sigdump-42.log");
}
