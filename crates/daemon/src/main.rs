// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `spaced`: the background process behind the autonomous swarm.
//!
//! Two halves share this one binary. Invoked bare, it is the supervisor:
//! acquire the lock, re-exec itself with [`space_daemon::supervisor::WORKER_SENTINEL`],
//! restart on crash with backoff. Invoked with that sentinel, it is the
//! worker: the process that actually ticks.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use space_daemon::{env::Paths, supervisor, worker::Worker, DaemonError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--version") | Some("-V") => {
            println!("spaced {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--help") | Some("-h") => {
            print_help();
            return Ok(());
        }
        Some(arg) if arg == supervisor::WORKER_SENTINEL => run_worker()?,
        Some(other) => {
            eprintln!("error: unexpected argument '{other}'");
            eprintln!("usage: spaced [--worker | --version | --help]");
            std::process::exit(1);
        }
        None => run_supervisor()?,
    }
    Ok(())
}

fn print_help() {
    println!("spaced {}", env!("CARGO_PKG_VERSION"));
    println!("Background process that runs the autonomous agent swarm.");
    println!();
    println!("spaced is normally launched by the CLI, not invoked directly.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}

fn run_supervisor() -> Result<(), Box<dyn std::error::Error>> {
    let paths = Paths::resolve()?;
    let _guard = init_logging(&paths)?;
    tracing::info!(pid = std::process::id(), "spaced supervisor starting");
    supervisor::run(&paths)?;
    Ok(())
}

fn run_worker() -> Result<(), Box<dyn std::error::Error>> {
    let paths = Paths::resolve()?;
    let _guard = init_logging(&paths)?;
    tracing::info!(pid = std::process::id(), "spaced worker starting");

    let mut worker = Worker::start(paths)?;
    worker.install_signal_handlers()?;
    worker.run()?;
    Ok(())
}

fn init_logging(paths: &Paths) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    paths.ensure_dirs()?;
    let dir = paths.log_path.parent().ok_or(DaemonError::NoStateRoot)?;
    let name = paths.log_path.file_name().ok_or(DaemonError::NoStateRoot)?;
    let file_appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
