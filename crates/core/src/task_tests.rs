// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use yare::parameterized;

fn task(status: TaskStatus) -> Task {
    Task {
        id: TaskId::new("t-1"),
        project_id: ProjectId::new("p-1"),
        creator_id: AgentId::new("a-0"),
        assignee_id: None,
        decision_id: None,
        spawn_id: None,
        content: "do the thing".into(),
        status,
        result: None,
        created_at: Utc::now(),
        closed_at: None,
        deleted_at: None,
    }
}

#[parameterized(
    pending_to_active = { TaskStatus::Pending, TaskStatus::Active, true },
    active_to_pending = { TaskStatus::Active, TaskStatus::Pending, true },
    pending_to_done = { TaskStatus::Pending, TaskStatus::Done, true },
    done_to_active = { TaskStatus::Done, TaskStatus::Active, false },
    cancelled_to_active = { TaskStatus::Cancelled, TaskStatus::Active, false },
)]
fn transition_table(from: TaskStatus, to: TaskStatus, allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[test]
fn claiming_requires_assignee() {
    let mut t = task(TaskStatus::Pending);
    let err = t.set_status(TaskStatus::Active, None, Utc::now()).unwrap_err();
    assert!(matches!(err, TaskTransitionError::MissingAssignee));
}

#[test]
fn claiming_sets_assignee_and_releasing_by_another_agent_fails() {
    let mut t = task(TaskStatus::Pending);
    let a1 = AgentId::new("a-1");
    let a2 = AgentId::new("a-2");
    t.set_status(TaskStatus::Active, Some(&a1), Utc::now()).unwrap();
    assert_eq!(t.assignee_id, Some(a1));

    let err = t
        .set_status(TaskStatus::Pending, Some(&a2), Utc::now())
        .unwrap_err();
    assert!(matches!(err, TaskTransitionError::WrongAssignee));
}

#[test]
fn done_sets_closed_at() {
    let mut t = task(TaskStatus::Active);
    t.assignee_id = Some(AgentId::new("a-1"));
    t.set_status(TaskStatus::Done, Some(&AgentId::new("a-1")), Utc::now())
        .unwrap();
    assert!(t.closed_at.is_some());
}
