// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn signal_outcome_is_plain_data() {
    assert_eq!(SignalOutcome::Sent, SignalOutcome::Sent);
    assert_ne!(SignalOutcome::Sent, SignalOutcome::Unsupported);
}

#[test]
fn backends_are_object_safe() {
    fn assert_object_safe(_: &dyn WorkerBackend) {}
    let mut embedded = EmbeddedBackend::new();
    assert_object_safe(&embedded as &dyn WorkerBackend);
    let _ = &mut embedded;
}
