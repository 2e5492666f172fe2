// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `space`: the operator-facing control surface for the `spaced` supervisor.
//! Deliberately thin — one subcommand, `daemon`, with `status`/`start`/
//! `stop`/`restart` actions. Job inspection, queue management, and the rest
//! of the rich reporting surface are out of scope here; the daemon itself
//! is the source of truth, reached through its trace files and state root.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod daemon_process;
mod env;
mod error;

use error::CliError;
use space_daemon::env::Paths;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<i32, CliError> {
    match args.first().map(String::as_str) {
        Some("daemon") => run_daemon(&args[1..]),
        Some("--version") | Some("-V") => {
            println!("space {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Some("--help") | Some("-h") | None => {
            print_help();
            Ok(0)
        }
        Some(other) => {
            eprintln!("unknown command '{other}'");
            print_help();
            Ok(1)
        }
    }
}

fn print_help() {
    println!("usage: space daemon [status|start|stop|restart] [-j|--json]");
}

struct DaemonArgs {
    action: String,
    json: bool,
}

fn parse_daemon_args(args: &[String]) -> DaemonArgs {
    let mut action = None;
    let mut json = false;
    for arg in args {
        match arg.as_str() {
            "-j" | "--json" => json = true,
            other if action.is_none() => action = Some(other.to_string()),
            _ => {}
        }
    }
    DaemonArgs { action: action.unwrap_or_else(|| "status".to_string()), json }
}

fn run_daemon(args: &[String]) -> Result<i32, CliError> {
    let parsed = parse_daemon_args(args);
    let paths = Paths::resolve()?;

    match parsed.action.as_str() {
        "status" => {
            let (payload, message) = daemon_status(&paths);
            print_result(&payload, &message, parsed.json);
            Ok(0)
        }
        "start" => {
            let (payload, message) = daemon_start(&paths)?;
            print_result(&payload, &message, parsed.json);
            Ok(0)
        }
        "stop" => {
            let stopped = daemon_process::stop_daemon(&paths.pid_path)?;
            let payload = serde_json::json!({ "stopped": stopped });
            let message = if stopped { "stopped" } else { "not running" };
            print_result(&payload, message, parsed.json);
            Ok(0)
        }
        "restart" => {
            let _ = daemon_process::stop_daemon(&paths.pid_path)?;
            let (payload, message) = daemon_start(&paths)?;
            let payload = rename_key(payload, "started", "restarted");
            let message = message.replacen("started", "restarted", 1);
            print_result(&payload, &message, parsed.json);
            Ok(0)
        }
        other => {
            eprintln!("unknown action '{other}'");
            print_help();
            Ok(1)
        }
    }
}

fn daemon_status(paths: &Paths) -> (serde_json::Value, String) {
    match daemon_process::read_pid(&paths.pid_path) {
        Some(pid) if daemon_process::process_exists(pid) => {
            (serde_json::json!({ "running": true, "pid": pid }), format!("running (pid {pid})"))
        }
        _ => (serde_json::json!({ "running": false }), "stopped".to_string()),
    }
}

fn daemon_start(paths: &Paths) -> Result<(serde_json::Value, String), CliError> {
    if let Some(pid) = daemon_process::read_pid(&paths.pid_path) {
        if daemon_process::process_exists(pid) {
            return Ok((serde_json::json!({ "started": false }), format!("already running (pid {pid})")));
        }
    }

    let child = daemon_process::start_daemon_background()?;
    let pid = child.id();
    Ok((serde_json::json!({ "started": true, "pid": pid }), format!("started (pid {pid})")))
}

fn rename_key(mut value: serde_json::Value, from: &str, to: &str) -> serde_json::Value {
    if let Some(obj) = value.as_object_mut() {
        if let Some(v) = obj.remove(from) {
            obj.insert(to.to_string(), v);
        }
    }
    value
}

fn print_result(payload: &serde_json::Value, message: &str, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()));
    } else {
        println!("{message}");
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
