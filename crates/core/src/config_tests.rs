// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_spec() {
    let cfg = Config::default();
    assert!(!cfg.daemonize);
    assert!(!cfg.supervisor);
    assert_eq!(cfg.workers, 1);
    assert_eq!(cfg.worker_type, WorkerType::Embedded);
    assert!(cfg.enable_detach);
    assert!(!cfg.exit_on_detach);
    assert_eq!(cfg.server_restart_wait, Duration::from_secs(1));
    assert_eq!(cfg.server_detach_wait, Duration::from_secs(10));
    assert_eq!(cfg.start_worker_delay_rand, 0.2);
    assert_eq!(cfg.worker_heartbeat_timeout, Duration::from_secs(180));
    assert_eq!(cfg.worker_graceful_kill_timeout, KillTimeout::After(Duration::from_secs(600)));
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.daemonize_error_exit_code, 1);
}

#[test]
fn default_validates() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn kill_timeout_minus_one_never_escalates() {
    let never = KillTimeout::from_secs_signed(-1).unwrap();
    assert_eq!(never, KillTimeout::Never);
    assert!(!never.elapsed_exceeds(Duration::from_secs(1_000_000)));
}

#[test]
fn kill_timeout_finite_escalates_once_exceeded() {
    let t = KillTimeout::from_secs_signed(5).unwrap();
    assert!(!t.elapsed_exceeds(Duration::from_secs(5)));
    assert!(t.elapsed_exceeds(Duration::from_secs(6)));
}

#[test]
fn kill_timeout_rejects_values_below_minus_one() {
    assert!(KillTimeout::from_secs_signed(-2).is_err());
}

#[test]
fn start_worker_delay_rand_out_of_range_is_rejected() {
    let cfg = ConfigBuilder::default().start_worker_delay_rand(1.5).build();
    assert!(cfg.validate().is_err());
}

#[test]
fn chumask_above_0o777_is_rejected() {
    let cfg = ConfigBuilder::default().chumask(Some(0o1000)).build();
    assert!(cfg.validate().is_err());
}

#[test]
fn unreasonably_large_worker_count_is_rejected() {
    let cfg = ConfigBuilder::default().workers(1_000_000).build();
    assert!(cfg.validate().is_err());
}

#[test]
fn log_level_from_str_loose() {
    assert_eq!(LogLevel::from_str_loose("warning"), Some(LogLevel::Warn));
    assert_eq!(LogLevel::from_str_loose("bogus"), None);
}

#[test]
fn dynamic_fields_changed_detects_workers_change() {
    let a = Config::default();
    let b = ConfigBuilder::default().workers(4).build();
    assert!(a.dynamic_fields_changed(&b));
    assert!(!a.dynamic_fields_changed(&a.clone()));
}

#[test]
fn dynamic_fields_changed_ignores_non_reloadable_fields() {
    let a = Config::default();
    let mut b = a.clone();
    b.daemonize = true;
    b.supervisor = true;
    assert!(!a.dynamic_fields_changed(&b));
}

#[test]
fn kill_interval_increment_timeout_index_by_stage() {
    let cfg = Config::default();
    use crate::worker::KillStage;
    assert_eq!(cfg.kill_interval(KillStage::Graceful), cfg.worker_graceful_kill_interval);
    assert_eq!(cfg.kill_interval(KillStage::Immediate), cfg.worker_immediate_kill_interval);
    assert_eq!(cfg.kill_timeout(KillStage::Forced), KillTimeout::Never);
}
