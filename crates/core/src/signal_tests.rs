// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn term_always_maps_to_graceful_stop() {
    assert_eq!(server_signal_to_event(Signal::Term, true, true), Some(Event::GracefulStop));
    assert_eq!(server_signal_to_event(Signal::Term, false, false), Some(Event::GracefulStop));
}

#[test]
fn quit_and_hup_require_process_backend() {
    assert_eq!(server_signal_to_event(Signal::Quit, true, true), Some(Event::ImmediateStop));
    assert_eq!(server_signal_to_event(Signal::Quit, false, true), None);
    assert_eq!(server_signal_to_event(Signal::Hup, true, true), Some(Event::ImmediateRestart));
    assert_eq!(server_signal_to_event(Signal::Hup, false, true), None);
}

#[test]
fn int_depends_on_detach_flag() {
    assert_eq!(server_signal_to_event(Signal::Int, true, true), Some(Event::Detach));
    assert_eq!(server_signal_to_event(Signal::Int, true, false), Some(Event::GracefulStop));
}

#[test]
fn usr1_usr2_cont_are_backend_independent() {
    assert_eq!(server_signal_to_event(Signal::Usr1, false, false), Some(Event::GracefulRestart));
    assert_eq!(server_signal_to_event(Signal::Usr2, false, false), Some(Event::Reload));
    assert_eq!(server_signal_to_event(Signal::Cont, false, false), Some(Event::Dump));
}

#[test]
fn kill_never_arrives_through_the_queue() {
    assert_eq!(server_signal_to_event(Signal::Kill, true, true), None);
}

#[yare::parameterized(
    term_process          = { Signal::Term, true,  true,  Some(Event::GracefulStop) },
    term_thread            = { Signal::Term, false, true,  Some(Event::GracefulStop) },
    quit_process           = { Signal::Quit, true,  true,  Some(Event::ImmediateStop) },
    quit_thread            = { Signal::Quit, false, true,  None },
    usr1_any               = { Signal::Usr1, false, true,  Some(Event::GracefulRestart) },
    hup_process            = { Signal::Hup,  true,  true,  Some(Event::ImmediateRestart) },
    hup_thread             = { Signal::Hup,  false, true,  None },
    usr2_any               = { Signal::Usr2, false, true,  Some(Event::Reload) },
    int_detach_enabled     = { Signal::Int,  true,  true,  Some(Event::Detach) },
    int_detach_disabled    = { Signal::Int,  true,  false, Some(Event::GracefulStop) },
    cont_any               = { Signal::Cont, false, false, Some(Event::Dump) },
    kill_never_queued      = { Signal::Kill, true,  true,  None },
)]
fn server_signal_to_event_table(
    signal: Signal,
    process_backend: bool,
    detach_enabled: bool,
    expected: Option<Event>,
) {
    assert_eq!(server_signal_to_event(signal, process_backend, detach_enabled), expected);
}

#[test]
fn event_slots_are_unique() {
    let all = [
        Event::GracefulStop,
        Event::ImmediateStop,
        Event::GracefulRestart,
        Event::ImmediateRestart,
        Event::Reload,
        Event::Detach,
        Event::Dump,
    ];
    let mut slots: Vec<usize> = all.iter().map(|e| e.slot()).collect();
    slots.sort_unstable();
    slots.dedup();
    assert_eq!(slots.len(), Event::COUNT);
}
