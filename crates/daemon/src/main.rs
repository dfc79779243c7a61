// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wardend`: the reference binary for the `warden` supervisor/server/
//! worker framework. Wires together config loading, logging, the process
//! environment, and one demo `WorkerHooks` implementation so the crate is
//! exercisable end to end; the demo worker itself is not part of the
//! framework's contract (§1: business logic is out of scope) — it only
//! proves the wiring works.
//!
//! Process roles, selected by `WARDEN_ROLE` (unset means "run the
//! supervisor, or the server directly if `supervisor = false`"):
//! - `server`: this process IS a Server, launched by a Supervisor parent
//!   with its command FIFO path in `WARDEN_COMMAND_PATH`.
//! - `worker`: this process IS a `process`-backend worker, launched by a
//!   Server parent with its heartbeat FIFO path in `WARDEN_HEARTBEAT_PATH`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use warden_core::Config;
use warden_daemon::hooks::{Context, NoopServerHooks, ServerHandle, WorkerError, WorkerHooks};
use warden_daemon::{
    blocking_flag::BlockingFlag, command_channel, config_loader::TomlConfigLoader, env, heartbeat,
    process_env::{DefaultProcessEnvironment, ProcessEnvironment},
    server::Server, signal_queue::SignalQueue, supervisor::Supervisor, DaemonError, OsSignals,
};

/// The demo worker: logs a heartbeat message on `worker_heartbeat_interval`
/// and exits as soon as `stop` is observed. A real embedding application
/// supplies its own `WorkerHooks` in place of this one.
struct DemoWorkerHooks;

#[async_trait::async_trait]
impl WorkerHooks for DemoWorkerHooks {
    async fn run(&self, ctx: &Context, stop: BlockingFlag) -> Result<(), WorkerError> {
        let interval = ctx.config().worker_heartbeat_interval.max(Duration::from_millis(100));
        info!(worker = ?ctx.worker_id(), "demo worker starting");
        while !stop.wait_for_set(interval) {
            info!(worker = ?ctx.worker_id(), "demo worker tick");
        }
        info!(worker = ?ctx.worker_id(), "demo worker stopping");
        Ok(())
    }

    fn stop(&self, ctx: &Context) {
        info!(worker = ?ctx.worker_id(), "demo worker stop requested");
    }
}

fn load_config() -> Config {
    let path = env::config_path();
    match TomlConfigLoader::new(&path).load() {
        Ok(config) => config,
        Err(err) => {
            warn!(?err, path = %path.display(), "failed to load config, falling back to defaults");
            Config::default()
        }
    }
}

/// Feed a signal queue from this process's OS signal stream, forever, in
/// a background task.
fn spawn_os_signal_forwarder(signals: SignalQueue, process_backend: bool, detach_enabled: bool) -> Result<(), std::io::Error> {
    let mut os_signals = OsSignals::install()?;
    tokio::spawn(async move {
        loop {
            let signal = os_signals.recv().await;
            let event = warden_core::server_signal_to_event(signal, process_backend, detach_enabled);
            if let Some(event) = event {
                signals.push(event);
            }
        }
    });
    Ok(())
}

/// Run as a `process`-backend worker child: read the role env vars the
/// parent Server set (see `worker_backend::process`), invoke the demo
/// hooks' `run`, and relay stop via a dedicated heartbeat-writing loop.
async fn run_worker_role() -> Result<(), DaemonError> {
    let heartbeat_path: PathBuf = std::env::var("WARDEN_HEARTBEAT_PATH")
        .map(PathBuf::from)
        .map_err(|_| DaemonError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "WARDEN_HEARTBEAT_PATH unset")))?;

    let config = Config::default();
    let stop = BlockingFlag::new();
    let server = ServerHandle::new(Arc::new(config));
    let worker_index: u32 = std::env::var("WARDEN_WORKER_INDEX").ok().and_then(|v| v.parse().ok()).unwrap_or(0);
    let ctx = Context::for_worker(server, tracing::info_span!("worker", worker_index), warden_core::WorkerId::new(worker_index));

    let beat_stop = stop.clone();
    let beat_task = tokio::spawn(async move {
        while !beat_stop.is_set() {
            if let Err(err) = heartbeat::write_beat_blocking(&heartbeat_path) {
                warn!(?err, "failed writing heartbeat");
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    });

    if let Err(err) = DemoWorkerHooks.run(&ctx, stop).await {
        error!(?err, "worker run() returned an error");
    }
    beat_task.abort();
    Ok(())
}

/// Run as a Server, either standalone (no supervisor) or as a Supervisor's
/// child (draining its command FIFO alongside OS signals).
async fn run_server_role(config: Config, run_dir: PathBuf, standalone: bool) -> Result<i32, DaemonError> {
    let signals = SignalQueue::new();
    let process_backend = config.worker_type == warden_core::WorkerType::Process;
    spawn_os_signal_forwarder(signals.clone(), process_backend, config.enable_detach)?;

    if !standalone {
        if let Ok(path) = std::env::var("WARDEN_COMMAND_PATH") {
            let reader = command_channel::reader(std::path::Path::new(&path))?;
            let queue = signals.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    if let Ok(events) = reader.drain() {
                        for event in events {
                            queue.push(event);
                        }
                    }
                }
            });
        }
    }

    let loader = Arc::new(TomlConfigLoader::new(env::config_path()));
    let mut server = Server::new(
        config,
        loader,
        Arc::new(NoopServerHooks),
        Arc::new(DemoWorkerHooks),
        signals,
        run_dir,
        warden_core::SystemClock,
    );
    server.run().await
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let config = load_config();
    let _guards = warden_daemon::logging::init(&config);

    let error_exit_code = config.daemonize_error_exit_code;
    let role = std::env::var("WARDEN_ROLE").unwrap_or_default();
    let run_dir = match env::run_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!(?err, "failed to resolve run directory");
            return std::process::ExitCode::from(error_exit_code as u8);
        }
    };

    let result = match role.as_str() {
        "worker" => run_worker_role().await.map(|_| 0),
        "server" => run_server_role(config.clone(), run_dir, false).await,
        _ => run_top_level(config, run_dir).await,
    };

    match result {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            error!(?err, "fatal error");
            std::process::ExitCode::from(error_exit_code as u8)
        }
    }
}

async fn run_top_level(config: Config, run_dir: PathBuf) -> Result<i32, DaemonError> {
    let env_driver = DefaultProcessEnvironment;
    if config.daemonize {
        env_driver.daemonize()?;
    }
    env_driver.drop_privileges(config.chuser.as_deref(), config.chgroup.as_deref(), config.chumask)?;

    let pid_path = config.pid_path.clone().unwrap_or_else(|| run_dir.join("warden.pid"));
    let _pid_guard = env_driver.acquire_pid_file(&pid_path)?;

    if config.supervisor {
        let signals = SignalQueue::new();
        let enable_detach = config.enable_detach;
        spawn_os_signal_forwarder(signals.clone(), true, enable_detach)?;
        let mut supervisor = Supervisor::new(config, run_dir, signals);
        supervisor.run().await?;
        Ok(0)
    } else {
        run_server_role(config, run_dir, true).await
    }
}
