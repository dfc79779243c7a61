// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use warden_core::ConfigBuilder;

use super::*;

#[test]
fn init_does_not_panic_and_returns_usable_guards() {
    let config = ConfigBuilder::default().log_stdout(false).log_stderr(false).build();
    let _guards = init(&config);
}

#[test]
fn level_mapping_collapses_fatal_onto_error() {
    assert_eq!(to_level_filter(LogLevel::Fatal), to_level_filter(LogLevel::Error));
    assert!(to_level_filter(LogLevel::Trace) > to_level_filter(LogLevel::Error));
}
