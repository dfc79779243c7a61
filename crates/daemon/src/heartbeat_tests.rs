// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn poll_beat_is_false_when_nothing_pending() {
    let dir = tempfile::tempdir().unwrap();
    let path = fifo_path(dir.path(), 0);
    let reader = fifo_reader(&path).unwrap();
    assert!(!reader.poll_beat().unwrap());
    assert!(!reader.poll_beat().unwrap());
}

#[tokio::test]
async fn fifo_round_trip_via_blocking_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = fifo_path(dir.path(), 0);
    let reader = fifo_reader(&path).unwrap();

    let write_path = path.clone();
    let writer = tokio::task::spawn_blocking(move || write_beat_blocking(&write_path));

    // Poll until the blocking writer's byte lands; bounded to avoid hanging
    // the test suite if the FIFO plumbing regresses.
    let mut observed = false;
    for _ in 0..200 {
        if reader.poll_beat().unwrap() {
            observed = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    writer.await.unwrap().unwrap();
    assert!(observed, "expected a heartbeat byte through the FIFO");
}
