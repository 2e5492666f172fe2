// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use space_core::{AgentKind, DecisionStatus, ParentType, Provenance, TaskStatus};
use space_core::{SequentialIdGen, UuidIdGen};
use space_store::Store;

fn ledger() -> Ledger<SequentialIdGen> {
    let store = Store::open_in_memory().expect("open in-memory store");
    Ledger::new(store, SequentialIdGen::new("t"))
}

/// `SequentialIdGen`'s `t-N` ids never look like an 8-hex-char citation
/// short id; tests that exercise citation parsing need real hex ids.
fn ledger_uuid() -> Ledger<UuidIdGen> {
    let store = Store::open_in_memory().expect("open in-memory store");
    Ledger::new(store, UuidIdGen)
}

#[test]
fn ensure_global_is_idempotent() {
    let ledger = ledger();
    let first = ledger.projects().ensure_global().unwrap();
    let second = ledger.projects().ensure_global().unwrap();
    assert_eq!(first.id, second.id);
}

#[test]
fn decision_lifecycle_commit_action() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let agent = ledger.agents().create("alice", AgentKind::Human, None, None).unwrap();

    let decision = ledger
        .decisions()
        .create(project.id.as_str(), agent.id.as_str(), None, "ship it", "low risk", Some(true), vec![])
        .unwrap();
    assert_eq!(decision.status(), DecisionStatus::Proposed);

    let committed = ledger.decisions().commit(decision.id.as_str(), crate::rows::now()).unwrap();
    assert_eq!(committed.status(), DecisionStatus::Committed);

    let actioned = ledger
        .decisions()
        .action(decision.id.as_str(), Some("done".to_string()), crate::rows::now())
        .unwrap();
    assert_eq!(actioned.status(), DecisionStatus::Actioned);
    assert_eq!(actioned.outcome.as_deref(), Some("done"));
}

#[test]
fn decision_action_before_commit_fails() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let agent = ledger.agents().create("alice", AgentKind::Human, None, None).unwrap();
    let decision = ledger
        .decisions()
        .create(project.id.as_str(), agent.id.as_str(), None, "ship it", "low risk", None, vec![])
        .unwrap();

    let err = ledger.decisions().action(decision.id.as_str(), None, crate::rows::now());
    assert!(err.is_err());
}

#[test]
fn insight_provenance_tracks_cited_agents() {
    let ledger = ledger_uuid();
    let project = ledger.projects().ensure_global().unwrap();
    let alice = ledger.agents().create("alice", AgentKind::Ai, None, None).unwrap();
    let bob = ledger.agents().create("bob", AgentKind::Ai, None, None).unwrap();

    let decision = ledger
        .decisions()
        .create(project.id.as_str(), bob.id.as_str(), None, "use sqlite", "simplicity", None, vec![])
        .unwrap();

    let solo = ledger
        .insights()
        .create(project.id.as_str(), alice.id.as_str(), None, None, "general", "noticed a pattern")
        .unwrap();
    assert_eq!(solo.provenance, Some(Provenance::Solo));

    let short = &decision.id.as_str()[..8];
    let content = format!("building on d/{short} this works well");
    let collaborative = ledger
        .insights()
        .create(project.id.as_str(), alice.id.as_str(), None, None, "general", &content)
        .unwrap();
    assert_eq!(collaborative.provenance, Some(Provenance::Collaborative));
}

#[test]
fn insight_content_validation_rejects_empty_and_overlong() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let agent = ledger.agents().create("alice", AgentKind::Ai, None, None).unwrap();

    assert!(ledger
        .insights()
        .create(project.id.as_str(), agent.id.as_str(), None, None, "general", "   ")
        .is_err());

    let too_long = "x".repeat(space_core::INSIGHT_MAX_LEN + 1);
    assert!(ledger
        .insights()
        .create(project.id.as_str(), agent.id.as_str(), None, None, "general", &too_long)
        .is_err());
}

#[test]
fn task_requires_assignee_to_go_active() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let creator = ledger.agents().create("alice", AgentKind::Human, None, None).unwrap();
    let assignee = ledger.agents().create("bob", AgentKind::Ai, None, None).unwrap();

    let task = ledger
        .tasks()
        .create(project.id.as_str(), creator.id.as_str(), None, None, None, "do the thing")
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);

    assert!(ledger.tasks().set_status(task.id.as_str(), TaskStatus::Active, None, None).is_err());

    let active = ledger
        .tasks()
        .set_status(task.id.as_str(), TaskStatus::Active, Some(assignee.id.as_str()), None)
        .unwrap();
    assert_eq!(active.status, TaskStatus::Active);
    assert_eq!(active.assignee_id.as_ref().map(|a| a.as_str()), Some(assignee.id.as_str()));

    let done = ledger
        .tasks()
        .set_status(task.id.as_str(), TaskStatus::Done, Some(assignee.id.as_str()), Some("ok".to_string()))
        .unwrap();
    assert!(done.closed_at.is_some());
}

#[test]
fn reply_at_human_expands_to_all_humans() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let human_a = ledger.agents().create("dana", AgentKind::Human, None, None).unwrap();
    let human_b = ledger.agents().create("eve", AgentKind::Human, None, None).unwrap();
    let ai = ledger.agents().create("bot", AgentKind::Ai, None, None).unwrap();

    let decision = ledger
        .decisions()
        .create(project.id.as_str(), ai.id.as_str(), None, "proposal", "why", None, vec![])
        .unwrap();

    let reply = ledger
        .replies()
        .create(
            ParentType::Decision,
            decision.id.as_str(),
            ai.id.as_str(),
            None,
            Some(project.id.as_str()),
            "@human please review",
        )
        .unwrap();

    assert!(reply.mentions.contains(&human_a.handle));
    assert!(reply.mentions.contains(&human_b.handle));
    assert!(!reply.mentions.contains(&"human".to_string()));
}

#[test]
fn citation_store_is_idempotent() {
    let ledger = ledger();
    let count_first = ledger.citations().store("decision", "d-1", "see i/01234567 and d/89abcdef").unwrap();
    let count_second = ledger.citations().store("decision", "d-1", "see i/01234567 and d/89abcdef").unwrap();
    assert_eq!(count_first, 2);
    assert_eq!(count_second, 2);

    let refs = ledger
        .citations()
        .refs_for_target(space_core::CitationTarget::Insight, "01234567")
        .unwrap();
    assert_eq!(refs, vec![("decision".to_string(), "d-1".to_string())]);
}

#[test]
fn artifact_mark_read_and_human_resolution() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let agent = ledger.agents().create("alice", AgentKind::Ai, None, None).unwrap();
    let decision = ledger
        .decisions()
        .create(project.id.as_str(), agent.id.as_str(), None, "x", "y", None, vec![])
        .unwrap();

    assert!(!ledger.artifacts().is_read("decision", decision.id.as_str(), agent.id.as_str()).unwrap());
    ledger.artifacts().mark_read("decision", decision.id.as_str(), agent.id.as_str()).unwrap();
    assert!(ledger.artifacts().is_read("decision", decision.id.as_str(), agent.id.as_str()).unwrap());

    assert!(ledger.artifacts().human_resolved_at("decision", decision.id.as_str()).unwrap().is_none());
    ledger.artifacts().resolve_for_humans("decision", decision.id.as_str()).unwrap();
    assert!(ledger.artifacts().human_resolved_at("decision", decision.id.as_str()).unwrap().is_some());
}

#[test]
fn inbox_surfaces_unread_mention_and_assigned_task() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let author = ledger.agents().create("alice", AgentKind::Ai, None, None).unwrap();
    let target = ledger.agents().create("bob", AgentKind::Ai, None, None).unwrap();

    ledger
        .decisions()
        .create(project.id.as_str(), author.id.as_str(), None, "@bob please commit this", "reason", None, vec![])
        .unwrap();
    ledger
        .tasks()
        .create(project.id.as_str(), author.id.as_str(), Some(target.id.as_str()), None, None, "review")
        .unwrap();

    let items = ledger.inbox().fetch(&target).unwrap();
    assert!(items.len() >= 2);
}

#[test]
fn prune_stale_status_archives_only_uncited_old_status_insights() {
    let ledger = ledger_uuid();
    let project = ledger.projects().ensure_global().unwrap();
    let agent = ledger.agents().create("alice", AgentKind::Ai, None, None).unwrap();

    let stale = ledger.insights().create(project.id.as_str(), agent.id.as_str(), None, None, "status", "old news").unwrap();
    let cited = ledger.insights().create(project.id.as_str(), agent.id.as_str(), None, None, "status", "still relevant").unwrap();
    let fresh = ledger.insights().create(project.id.as_str(), agent.id.as_str(), None, None, "status", "just happened").unwrap();

    ledger
        .decisions()
        .create(project.id.as_str(), agent.id.as_str(), None, &format!("see i/{}", &cited.id.as_str()[..8]), "r", None, vec![])
        .unwrap();

    let old_cutoff = crate::rows::now() - chrono::Duration::hours(96);
    ledger
        .store()
        .with_conn(|conn| {
            conn.execute("UPDATE insights SET created_at = ?1 WHERE id IN (?2, ?3)", rusqlite::params![old_cutoff, stale.id.as_str(), cited.id.as_str()])?;
            Ok(())
        })
        .unwrap();

    let archived = ledger.insights().prune_stale_status(72).unwrap();
    assert_eq!(archived, 1);

    assert!(ledger.insights().get(stale.id.as_str()).unwrap().archived_at.is_some());
    assert!(ledger.insights().get(cited.id.as_str()).unwrap().archived_at.is_none());
    assert!(ledger.insights().get(fresh.id.as_str()).unwrap().archived_at.is_none());
}

#[test]
fn clear_inertia_summaries_blanks_matching_spawn_summaries_only() {
    let ledger = ledger();
    let agent = ledger.agents().create("alice", AgentKind::Ai, Some("claude-sonnet-4-5".to_string()), None).unwrap();

    ledger
        .store()
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO spawns (id, agent_id, provider, mode, status, summary, created_at)
                 VALUES ('s1', ?1, 'claude', 'sovereign', 'done', 'swarm correctly idle, nothing to do', ?2)",
                rusqlite::params![agent.id.as_str(), crate::rows::now()],
            )?;
            conn.execute(
                "INSERT INTO spawns (id, agent_id, provider, mode, status, summary, created_at)
                 VALUES ('s2', ?1, 'claude', 'sovereign', 'done', 'shipped the migration', ?2)",
                rusqlite::params![agent.id.as_str(), crate::rows::now()],
            )?;
            Ok(())
        })
        .unwrap();

    let cleared = ledger.spawns().clear_inertia_summaries().unwrap();
    assert_eq!(cleared, 1);
    assert!(ledger.spawns().get("s1").unwrap().summary.is_none());
    assert_eq!(ledger.spawns().get("s2").unwrap().summary.as_deref(), Some("shipped the migration"));
}

#[test]
fn decay_human_blocked_uncommits_stale_at_human_decisions_only() {
    let ledger = ledger();
    let project = ledger.projects().ensure_global().unwrap();
    let agent = ledger.agents().create("alice", AgentKind::Ai, None, None).unwrap();

    let blocked = ledger
        .decisions()
        .create(project.id.as_str(), agent.id.as_str(), None, "@human please approve this", "r", None, vec![])
        .unwrap();
    let unblocked = ledger
        .decisions()
        .create(project.id.as_str(), agent.id.as_str(), None, "ship it", "r", None, vec![])
        .unwrap();

    let old = crate::rows::now() - chrono::Duration::hours(72);
    ledger.decisions().commit(blocked.id.as_str(), old).unwrap();
    ledger.decisions().commit(unblocked.id.as_str(), old).unwrap();

    let decayed = ledger.decisions().decay_human_blocked(48).unwrap();
    assert_eq!(decayed, vec![blocked.id.clone()]);

    assert_eq!(ledger.decisions().get(blocked.id.as_str()).unwrap().status(), DecisionStatus::Proposed);
    assert_eq!(ledger.decisions().get(unblocked.id.as_str()).unwrap().status(), DecisionStatus::Committed);
}

#[test]
fn ledger_defaults_to_uuid_id_gen() {
    let store = Store::open_in_memory().unwrap();
    let _ledger: Ledger = Ledger::new(store, UuidIdGen);
}
