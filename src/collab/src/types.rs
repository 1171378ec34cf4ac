//! Worker records and collaboration sessions (spec §3, §4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Online,
    Offline,
}

/// Everything the collaboration manager tracks about a worker beyond
/// what the load balancer owns (capacity, load, performance samples).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub worker_id: String,
    pub worker_type: String,
    pub capabilities: HashSet<String>,
    pub status: WorkerStatus,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
}

impl WorkerRecord {
    pub fn new(
        worker_id: impl Into<String>,
        worker_type: impl Into<String>,
        capabilities: HashSet<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_type: worker_type.into(),
            capabilities,
            status: WorkerStatus::Online,
            registered_at: now,
            last_heartbeat: now,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == WorkerStatus::Online
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationSession {
    pub collaboration_id: Uuid,
    pub collaboration_type: String,
    pub participants: Vec<String>,
    pub context: Value,
    pub shared_data: Value,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub result: Option<Value>,
}

impl CollaborationSession {
    pub fn new(
        collaboration_type: impl Into<String>,
        participants: Vec<String>,
        context: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            collaboration_id: Uuid::new_v4(),
            collaboration_type: collaboration_type.into(),
            participants,
            context,
            shared_data: Value::Object(Default::default()),
            started_at: now,
            ended_at: None,
            result: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}
