// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging (C11): wires `tracing` subscribers for stdout/stderr and an
//! optional rotating log file, from the option set in §6. Called once, at
//! daemon startup, before the supervisor loop begins.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use warden_core::{Config, LogLevel};

/// Guards returned by [`init`] must be held for the process lifetime;
/// dropping them flushes and stops the non-blocking background writers.
pub struct LoggingGuards {
    _file: Option<WorkerGuard>,
}

/// `Fatal` has no backing level in `tracing`; it is logged as `Error` with
/// a distinguishing field, as documented at the call sites that emit it.
fn to_level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
    }
}

/// Install the process-wide `tracing` subscriber per `config`'s logger
/// options. Idempotent-on-failure: if a global subscriber is already set
/// (e.g. a second call within one test process), this logs nothing and
/// returns guards that do nothing when dropped.
pub fn init(config: &Config) -> LoggingGuards {
    let level = to_level_filter(config.log_level);

    let stdout_layer = config
        .log_stdout
        .then(|| fmt::layer().with_writer(std::io::stdout).with_target(true));
    let stderr_layer = config
        .log_stderr
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(true));

    let (file_layer, file_guard) = match &config.log {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("warden.log");
            let rotation = if config.log_rotate_age > 0 { Rotation::DAILY } else { Rotation::NEVER };
            let appender = RollingFileAppender::new(rotation, dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(level)
        .with(stdout_layer)
        .with(stderr_layer)
        .with(file_layer);

    // Tests may install this more than once across the suite; ignore the
    // "already set" error rather than panicking the test harness.
    let _ = subscriber.try_init();

    LoggingGuards { _file: file_guard }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
