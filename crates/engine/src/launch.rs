// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ten-step launch sequence: resolve or create the spawn row, gate on
//! provider cooldown, compose the prompt, inject identity, open the trace
//! file, fork the vendor CLI, and hand the child off to a monitor thread.

use crate::{identity, persistence, watch, EngineError};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use space_context::{resume as resume_prompt, wake, WakeOptions};
use space_core::{Agent, AgentId, CanonicalEvent, IdGen, ProviderName, Spawn, SpawnId, SpawnMode};
use space_ledger::Ledger;
use space_providers::tools::Capability;
use space_pubsub::Registry;
use space_router::Router;
use std::io::Write as _;
use std::os::unix::process::CommandExt as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Everything about a launch request that varies per call, as opposed to
/// the standing deployment paths in [`LaunchEnv`].
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub agent_id: AgentId,
    pub instruction: Option<String>,
    pub spawn: Option<Spawn>,
    pub cwd: Option<String>,
    pub timeout: Duration,
    pub model_override: Option<String>,
    pub mode: SpawnMode,
    pub caller_spawn_id: Option<SpawnId>,
    pub skills: Vec<String>,
    pub focus_project: Option<String>,
    pub allowed_tools: Option<Vec<Capability>>,
    pub images: Vec<String>,
}

/// Standing paths and shared infrastructure a launch needs, constant across
/// calls within one daemon process.
pub struct LaunchEnv<'a> {
    pub state_root: &'a Path,
    pub identities_root: &'a Path,
    pub skills_dir: Option<&'a Path>,
    pub bus: &'a Registry<CanonicalEvent>,
    pub router: &'a Router,
}

/// Runs the ten-step launch sequence and blocks on the monitor thread until
/// the spawn finishes, times out, or is reaped — callers that want a
/// fire-and-forget launch run this on its own `std::thread::spawn`.
pub fn launch<I: IdGen>(ledger: &Ledger<I>, ids: &I, env: &LaunchEnv<'_>, req: LaunchRequest) -> Result<Spawn, EngineError> {
    let agent = ledger.agents().get(req.agent_id.as_str())?;
    let provider = resolve_provider(&agent, req.model_override.as_deref())?;

    let (spawn, resumed) = match req.spawn {
        Some(existing) => {
            if existing.is_active() && existing.pid.is_some() {
                return Err(EngineError::AlreadyActive(existing.id.as_str().to_string()));
            }
            if !existing.is_active() && !existing.is_resumable() {
                return Err(EngineError::NotResumable(existing.id.as_str().to_string()));
            }
            let resumed = existing.session_id.is_some();
            persistence::mark_resumed(ledger.store(), &existing.id)?;
            (ledger.spawns().get(existing.id.as_str())?, resumed)
        }
        None => {
            let spawn = persistence::get_or_create(ledger, ids, &agent.id, req.caller_spawn_id.as_ref(), provider, req.mode)?;
            (spawn, false)
        }
    };

    if env.router.provider_blocked(provider) {
        let until = env.router.provider_blocked_until(provider).unwrap_or_else(chrono::Utc::now);
        return Err(EngineError::ProviderCooldown(provider.to_string(), until));
    }

    let context = if resumed {
        resume_prompt(req.instruction.as_deref().unwrap_or_default(), Some(&spawn))
    } else {
        let options = WakeOptions { focus_project: req.focus_project.as_deref(), skills_dir: env.skills_dir, skills: req.skills.clone() };
        wake(ledger, &agent, &spawn, &options)?
    };

    let identity_dir = identity::inject(env.identities_root, &agent, provider, &context)?;

    let trace_path = space_trace::trace_path(env.state_root, provider, &spawn.id);
    let stderr_path = space_trace::stderr_path(env.state_root, provider, &spawn.id);
    let writer = space_trace::Writer::open(&trace_path)?;
    writer.append_event(&CanonicalEvent::ContextInit {
        session_id: spawn.session_id.clone().unwrap_or_default(),
        resumed,
    })?;

    let model = req.model_override.clone().unwrap_or_else(|| agent.model.clone().unwrap_or_default());
    let launch_request = space_providers::LaunchRequest {
        model,
        session_id: spawn.session_id.clone(),
        context: Some(context),
        root_dir: env.state_root.display().to_string(),
        cwd: req.cwd.clone(),
        allowed_tools: req.allowed_tools.clone(),
        images: req.images.clone(),
    };
    let built = space_providers::adapter_for(provider).build_command(&launch_request)?;

    let stdin_path = built.stdin.as_ref().map(|content| materialize_stdin(env.state_root, &spawn.id, content)).transpose()?;

    let (pid, child) =
        spawn_vendor_process(&built.argv, stdin_path.as_deref(), &trace_path, &stderr_path, &identity_dir, &agent, &spawn.id)?;

    if !persistence::set_pid_atomic(ledger.store(), &spawn.id, pid)? {
        let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
        drop(child);
        return Err(EngineError::PidRace(spawn.id.as_str().to_string()));
    }

    watch::run(
        ledger,
        env.bus,
        &spawn.id,
        provider,
        watch::WatchParams { trace_path, stderr_path, pid, timeout: req.timeout },
    )
}

fn resolve_provider(agent: &Agent, model_override: Option<&str>) -> Result<ProviderName, EngineError> {
    let model = model_override.or(agent.model.as_deref()).unwrap_or_default();
    space_providers::models::map(model).map_err(EngineError::from)
}

/// Writes `content` to `<state_root>/spawns/<spawn_id>.stdin` so the vendor
/// CLI can read it as a file rather than keeping a pipe-writer thread alive
/// for the life of the process.
fn materialize_stdin(state_root: &Path, spawn_id: &SpawnId, content: &str) -> Result<PathBuf, EngineError> {
    let path = state_root.join("spawns").join(format!("{}.stdin", spawn_id.as_str()));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut f = std::fs::File::create(&path)?;
    f.write_all(content.as_bytes())?;
    Ok(path)
}

/// Forks the vendor CLI into its own process group (detached from the
/// daemon's), cwd'd into the agent's identity directory with its commit
/// identity exported, stdout appended to the trace file (after the
/// synthetic `context_init` line already written there) and stderr to its
/// sibling.
fn spawn_vendor_process(
    argv: &[String],
    stdin_path: Option<&Path>,
    trace_path: &Path,
    stderr_path: &Path,
    identity_dir: &Path,
    agent: &Agent,
    spawn_id: &SpawnId,
) -> Result<(i32, std::process::Child), EngineError> {
    let [program, args @ ..] = argv else {
        return Err(EngineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv")));
    };

    let stdout_file = std::fs::OpenOptions::new().create(true).append(true).open(trace_path)?;
    let stderr_file = std::fs::OpenOptions::new().create(true).append(true).open(stderr_path)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(identity_dir)
        .env("SPACE_SPAWN_ID", spawn_id.as_str())
        .env("SPACE_IDENTITY", &agent.handle)
        .env("GIT_AUTHOR_NAME", &agent.handle)
        .env("GIT_AUTHOR_EMAIL", format!("{}@space.local", agent.handle))
        .env("GIT_COMMITTER_NAME", &agent.handle)
        .env("GIT_COMMITTER_EMAIL", format!("{}@space.local", agent.handle))
        .env("GIT_CONFIG_GLOBAL", identity_dir.join(".gitconfig"))
        .stdout(stdout_file)
        .stderr(stderr_file)
        .process_group(0);

    match stdin_path {
        Some(path) => {
            cmd.stdin(std::fs::File::open(path)?);
        }
        None => {
            cmd.stdin(Stdio::null());
        }
    }

    let child = cmd.spawn()?;
    let pid = child.id() as i32;
    Ok((pid, child))
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
