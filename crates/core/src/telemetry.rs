// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ambient telemetry rows: registered push-notification endpoints and a
//! log of CLI invocations. Neither participates in orchestration; both
//! exist so the stats tooling and push-delivery adapter (out of scope here)
//! have something to read.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a registered device.
    pub struct DeviceId;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub owner_id: AgentId,
    pub tailscale_ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

crate::define_id! {
    /// Unique identifier for a recorded CLI invocation.
    pub struct InvocationId;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliInvocation {
    pub id: InvocationId,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
