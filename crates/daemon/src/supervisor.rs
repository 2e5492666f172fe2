// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor: a thin process that holds the exclusive lock, re-execs
//! itself as a worker, and restarts the worker with backoff if it dies.
//! Runs as the long-lived half of the daemon; the worker does the actual
//! ticking and is free to crash without losing the lock.

use crate::env::Paths;
use crate::DaemonError;
use fs2::FileExt;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Argument re-exec'd children are launched with, so `main` can tell a
/// worker invocation from a fresh supervisor invocation.
pub const WORKER_SENTINEL: &str = "--worker";

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(120);
const HEALTHY_UPTIME: Duration = Duration::from_secs(10);

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Acquires the exclusive lock and runs the supervise loop. Returns
/// `Ok(())` silently (not an error) if another supervisor already holds
/// the lock — this is the expected outcome of a second `spaced` invocation
/// racing the first.
pub fn run(paths: &Paths) -> Result<(), DaemonError> {
    paths.ensure_dirs()?;

    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&paths.lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        tracing::info!("another daemon already holds the lock, exiting");
        return Ok(());
    }

    tracing::info!(pid = std::process::id(), "supervisor acquired lock");
    write_pid(&paths.pid_path, std::process::id())?;
    supervise(paths);

    drop(lock_file);
    let _ = std::fs::remove_file(&paths.pid_path);
    let _ = std::fs::remove_file(&paths.lock_path);
    Ok(())
}

fn supervise(paths: &Paths) {
    let shutdown = install_forwarding_signal_handler();
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if shutdown.load(std::sync::atomic::Ordering::SeqCst) {
            return;
        }

        rotate_log_if_needed(&paths.log_path);
        let mut child = match spawn_worker(paths) {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn worker, backing off");
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };
        let started = Instant::now();

        let status = wait_with_shutdown(&mut child, &shutdown);

        if shutdown.load(std::sync::atomic::Ordering::SeqCst) {
            return;
        }

        match status {
            Ok(status) => tracing::warn!(?status, "worker exited, restarting"),
            Err(e) => tracing::warn!(error = %e, "failed to wait on worker, restarting"),
        }

        if started.elapsed() >= HEALTHY_UPTIME {
            backoff = INITIAL_BACKOFF;
        } else {
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }
}

fn spawn_worker(paths: &Paths) -> std::io::Result<Child> {
    let exe = std::env::current_exe()?;
    let log = std::fs::OpenOptions::new().create(true).append(true).open(&paths.log_path)?;
    Command::new(exe).arg(WORKER_SENTINEL).stdin(Stdio::null()).stdout(Stdio::null()).stderr(log).spawn()
}

/// Records the supervisor's own pid in `daemon.pid` so a CLI can find the
/// process to signal without parsing the lock file.
fn write_pid(path: &std::path::Path, pid: u32) -> std::io::Result<()> {
    std::fs::write(path, pid.to_string())
}

/// Waits on the child, polling every 200ms so a pending shutdown request
/// can interrupt the wait and send the grace/kill sequence.
fn wait_with_shutdown(child: &mut Child, shutdown: &std::sync::Arc<std::sync::atomic::AtomicBool>) -> std::io::Result<std::process::ExitStatus> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if shutdown.load(std::sync::atomic::Ordering::SeqCst) {
            terminate_child(child);
            return child.wait();
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

fn terminate_child(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(child.id() as i32);
    let _ = kill(pid, Signal::SIGTERM);

    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while Instant::now() < deadline {
        if let Ok(Some(_)) = child.try_wait() {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    let _ = child.kill();
}

/// Installs SIGTERM/SIGINT handlers on the supervisor itself; `supervise`
/// checks the returned flag between wait-loop polls and forwards the
/// shutdown to the active worker.
fn install_forwarding_signal_handler() -> std::sync::Arc<std::sync::atomic::AtomicBool> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let flag = Arc::new(AtomicBool::new(false));
    let watcher = Arc::clone(&flag);
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_io().build() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to start supervisor signal-watch runtime");
                return;
            }
        };
        rt.block_on(async move {
            let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => return,
            };
            let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) {
                Ok(s) => s,
                Err(_) => return,
            };
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
            watcher.store(true, Ordering::SeqCst);
        });
    });
    flag
}

/// Shifts `daemon.log` → `.1` → `.2` → `.3`, dropping the oldest, once the
/// current log crosses [`MAX_LOG_SIZE`]. Best-effort: a failed rotation
/// never blocks startup.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
