//! `TaskAssignment` and its lifecycle (spec §3).

use chrono::{DateTime, Utc};
use patentflow_common::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Assigned,
    Running,
    WaitingForDependency,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: Uuid,
    pub worker_id: String,
    pub task_type: String,
    pub task_data: Value,
    pub priority: i32,
    pub status: TaskStatus,
    pub assigned_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub error: Option<CoreError>,
    pub depends_on: Vec<Uuid>,
    pub retry_count: u32,
}

impl TaskAssignment {
    pub fn new(
        worker_id: impl Into<String>,
        task_type: impl Into<String>,
        task_data: Value,
        priority: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            worker_id: worker_id.into(),
            task_type: task_type.into(),
            task_data,
            priority,
            status: TaskStatus::Assigned,
            assigned_at: now,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            depends_on: Vec::new(),
            retry_count: 0,
        }
    }

    /// `completed_at >= started_at >= assigned_at` when present (spec §3
    /// invariant).
    pub fn timestamps_are_ordered(&self) -> bool {
        if let Some(started) = self.started_at {
            if started < self.assigned_at {
                return false;
            }
        }
        if let (Some(completed), Some(started)) = (self.completed_at, self.started_at) {
            if completed < started {
                return false;
            }
        }
        true
    }
}
