// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! space-core: shared domain types, ids, and error taxonomy for the
//! orchestration substrate. Every other crate in the workspace depends on
//! this one; it depends on nothing in the workspace.

pub mod agent;
pub mod citation;
pub mod decision;
pub mod error;
pub mod event;
pub mod id;
pub mod insight;
pub mod reply;
pub mod spawn;
pub mod task;
pub mod telemetry;

pub use agent::{Agent, AgentId, AgentKind, Project, ProjectId, ProjectKind, GLOBAL_PROJECT_NAME};
pub use citation::{extract_citations, Citation, CitationTarget};
pub use decision::{Decision, DecisionId, DecisionStateError, DecisionStatus};
pub use error::{Classified, Kind};
pub use event::{CanonicalEvent, Role, SpawnState};
pub use id::{IdGen, ShortId, UuidIdGen};
pub use insight::{Insight, InsightId, InsightValidationError, Provenance, INSIGHT_MAX_LEN};
pub use reply::{parse_mentions, ParentType, Reply, ReplyId};
pub use spawn::{ProviderName, Spawn, SpawnId, SpawnMode, SpawnStatus, RESUMABLE_ERRORS};
pub use task::{Task, TaskId, TaskStatus, TaskTransitionError};
pub use telemetry::{CliInvocation, Device, DeviceId, InvocationId};
