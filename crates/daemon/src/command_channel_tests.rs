// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tempfile::tempdir;

use super::*;

#[tokio::test]
async fn writer_and_reader_roundtrip_coalesce_free() {
    let dir = tempdir().unwrap();
    let fifo = path(dir.path(), 1);
    let w = writer(&fifo).unwrap();
    // Reader opens after the writer creates the FIFO, mirroring the child
    // process's own startup order.
    let r = reader(&fifo).unwrap();

    w.send(Event::GracefulStop).await.unwrap();
    w.send(Event::Reload).await.unwrap();

    // Give the FIFO a moment to become readable.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let events = r.drain().unwrap();
    assert_eq!(events, vec![Event::GracefulStop, Event::Reload]);
}

#[test]
fn byte_mapping_is_total_and_inverse() {
    for event in [
        Event::GracefulStop,
        Event::ImmediateStop,
        Event::GracefulRestart,
        Event::ImmediateRestart,
        Event::Reload,
        Event::Detach,
        Event::Dump,
    ] {
        assert_eq!(from_byte(to_byte(event)), Some(event));
    }
}

#[test]
fn path_is_keyed_by_generation() {
    let dir = tempdir().unwrap();
    assert_ne!(path(dir.path(), 1), path(dir.path(), 2));
}
