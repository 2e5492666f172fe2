// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker: the process that actually ticks. Re-exec'd by the
//! supervisor with [`crate::supervisor::WORKER_SENTINEL`] as its first
//! argument; owns the ledger connection, router, and config stores for the
//! lifetime of one supervised run.

use crate::env::Paths;
use crate::DaemonError;
use chrono::Utc;
use space_config::{Config, ConfigStore, StateFile};
use space_core::{CanonicalEvent, UuidIdGen};
use space_engine::LaunchEnv;
use space_ledger::Ledger;
use space_pubsub::Registry;
use space_router::{CapacityProbe, CodexLimitsProbe, NullCapacityProbe, Router};
use space_store::Store;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default interval between ticks; overridable via `SPACE_TICK_MS` so tests
/// don't wait 2 real seconds per iteration.
const TICK_INTERVAL: Duration = Duration::from_secs(2);

pub struct Worker {
    paths: Paths,
    ledger: Ledger<UuidIdGen>,
    config_store: ConfigStore,
    state: StateFile,
    router: Router,
    bus: Registry<CanonicalEvent>,
    housekeeping: crate::housekeeping::Schedule,
    shutdown: Arc<AtomicBool>,
}

impl Worker {
    pub fn start(paths: Paths) -> Result<Self, DaemonError> {
        paths.ensure_dirs()?;
        let store = Store::open(&paths.db_path)?;
        let repaired = store.repair_fts_if_needed()?;
        if !repaired.is_empty() {
            tracing::warn!(tables = ?repaired, "rebuilt corrupted fts indexes at startup");
        }
        let ledger = Ledger::new(store, UuidIdGen);

        let config_store = ConfigStore::new(&paths.config_path);
        let state = StateFile::new(&paths.state_yaml_path);

        let mut probes: HashMap<space_core::ProviderName, Box<dyn CapacityProbe>> = HashMap::new();
        probes.insert(space_core::ProviderName::Codex, Box::new(CodexLimitsProbe::default_location()));
        probes.insert(space_core::ProviderName::Claude, Box::new(NullCapacityProbe));
        probes.insert(space_core::ProviderName::Gemini, Box::new(NullCapacityProbe));
        let capacity_threshold = config_store.load()?.swarm.capacity_threshold;
        let router = Router::new(&paths.router_state_path, capacity_threshold, probes);

        Ok(Self {
            paths,
            ledger,
            config_store,
            state,
            router,
            bus: Registry::default(),
            housekeeping: crate::housekeeping::Schedule::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Installs SIGTERM/SIGINT handlers that flip the returned flag instead
    /// of terminating the process outright — `run` checks it once per tick
    /// so in-flight work finishes before exit. Runs on a dedicated thread
    /// with its own tiny runtime since the tick loop itself stays
    /// synchronous; only signal delivery needs async.
    pub fn install_signal_handlers(&self) -> Result<(), DaemonError> {
        let flag = Arc::clone(&self.shutdown);
        std::thread::Builder::new()
            .name("signal-watch".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread().enable_io().build() {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to start signal-watch runtime");
                        return;
                    }
                };
                rt.block_on(async move {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to install SIGTERM handler");
                            return;
                        }
                    };
                    let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to install SIGINT handler");
                            return;
                        }
                    };
                    tokio::select! {
                        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                        _ = sigint.recv() => tracing::info!("received SIGINT"),
                    }
                    flag.store(true, Ordering::SeqCst);
                });
            })
            .map_err(DaemonError::Io)?;
        Ok(())
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Ticks until the shutdown flag is set, sleeping [`TICK_INTERVAL`]
    /// (or `SPACE_TICK_MS`) between iterations.
    pub fn run(&mut self) -> Result<(), DaemonError> {
        let interval = crate::env::tick_ms().unwrap_or(TICK_INTERVAL);
        while !self.shutdown.load(Ordering::Relaxed) {
            if let Err(e) = self.tick() {
                tracing::error!(error = %e, "tick failed");
            }
            std::thread::sleep(interval);
        }
        tracing::info!("worker shutting down");
        Ok(())
    }

    /// One pass: reconcile dead processes, run housekeeping if due, then —
    /// if the swarm is enabled and under its launch limit — resume one
    /// crashed spawn and pick idle agents to fill remaining slots.
    pub fn tick(&mut self) -> Result<(), DaemonError> {
        let now = Utc::now();

        let reaped = space_engine::lifecycle::reap(&self.ledger, now)?;
        let reconciled = space_engine::lifecycle::reconcile(self.ledger.store())?;
        if !reaped.is_empty() || reconciled > 0 {
            tracing::warn!(reaped = reaped.len(), reconciled, "spawn reconcile");
        }

        let config = self.config_store.load()?;
        if let Some(report) = self.housekeeping.run_if_due(&self.ledger, config.stats_json_path.as_deref(), now)? {
            tracing::debug!(?report, "housekeeping ran");
        }

        if !config.swarm.enabled {
            return Ok(());
        }
        if self.limit_reached(&config, now)? {
            self.disable_swarm(&config)?;
            return Ok(());
        }

        self.spawn_tick(&config, now)
    }

    /// `swarm.limit` counts spawns created since `swarm.enabled_at`; once
    /// reached, the swarm turns itself off rather than the whole daemon
    /// process exiting — the supervisor/worker split makes "stop the
    /// daemon" a distinct, CLI-driven action from "pause autonomous
    /// spawning".
    fn limit_reached(&self, config: &Config, _now: chrono::DateTime<Utc>) -> Result<bool, DaemonError> {
        let Some(limit) = config.swarm.limit else { return Ok(false) };
        let Some(enabled_at) = &config.swarm.enabled_at else { return Ok(false) };
        let Ok(since) = enabled_at.parse::<chrono::DateTime<Utc>>() else { return Ok(false) };
        let launched = self.ledger.store().with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM spawns WHERE created_at >= ?1", [since], |row| row.get::<_, i64>(0))
        })?;
        Ok(launched >= limit as i64)
    }

    fn disable_swarm(&self, config: &Config) -> Result<(), DaemonError> {
        let mut config = config.clone();
        config.swarm.enabled = false;
        config.swarm.limit = None;
        self.config_store.save(&config)?;
        tracing::warn!("swarm launch limit reached, swarm disabled");
        Ok(())
    }

    fn spawn_tick(&self, config: &Config, now: chrono::DateTime<Utc>) -> Result<(), DaemonError> {
        let env = LaunchEnv {
            state_root: &self.paths.state_root,
            identities_root: &self.paths.identities_root,
            skills_dir: None,
            bus: &self.bus,
            router: &self.router,
        };

        let mut active = space_scheduler::active_sovereign(&self.ledger)?;
        let mut slots = space_scheduler::available_slots(config, &active);

        let resumed = space_scheduler::resume_step(&self.ledger, &UuidIdGen, &env, slots, &active)?;
        if !resumed.is_empty() {
            tracing::warn!(count = resumed.len(), "resumed crashed sovereign spawns");
            active = space_scheduler::active_sovereign(&self.ledger)?;
            slots = space_scheduler::available_slots(config, &active);
        }
        if slots == 0 {
            return Ok(());
        }

        let picked = space_scheduler::pick_idle_agents(&self.ledger, config, &self.router, &self.state, slots, &active, now)?;
        if !picked.is_empty() {
            tracing::info!(slots, handles = ?picked.iter().map(|a| a.handle.as_str()).collect::<Vec<_>>(), "picked idle agents");
        }
        for agent in picked {
            if let Err(e) = space_scheduler::spawn_agent(&self.ledger, &UuidIdGen, &env, &self.router, &self.state, &agent, now) {
                tracing::error!(agent = agent.handle, error = %e, "spawn_agent failed");
                break;
            }
            active = space_scheduler::active_sovereign(&self.ledger)?;
            if space_scheduler::available_slots(config, &active) == 0 {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
