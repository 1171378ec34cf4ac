//! The collaboration manager itself (spec §4.4): worker registry, task
//! dispatch through C2/C3, the retry policy, and collaboration sessions.

use crate::metrics::CollabMetrics;
use crate::types::{CollaborationSession, WorkerRecord, WorkerStatus};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use patentflow_balancer::LoadBalancer;
use patentflow_bus::{Message, MessageBus, MessageType};
use patentflow_common::{Clock, CoreError, CoreResult, ErrorKind};
use patentflow_registry::{DependencyFanout, TaskAssignment, TaskRegistry};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Retries below this count are eligible for the retry policy (spec §4.4:
/// "the task's prior retries < 2").
const MAX_AUTO_RETRIES: u32 = 2;
const DEFAULT_TIMEOUT_MINUTES: i64 = 5;

/// Outcome of `fail_task`: either the task was quietly re-assigned under
/// the retry policy, or the failure was surfaced and dependents cascaded.
#[derive(Debug)]
pub enum FailOutcome {
    Retried { new_worker_id: String, new_priority: i32 },
    Surfaced(DependencyFanout),
}

pub struct CollaborationManager {
    bus: Arc<MessageBus>,
    balancer: Arc<LoadBalancer>,
    registry: Arc<TaskRegistry>,
    clock: Arc<dyn Clock>,
    workers: DashMap<String, WorkerRecord>,
    sessions: DashMap<Uuid, CollaborationSession>,
    timeout_minutes: i64,
    metrics: CollabMetrics,
}

impl CollaborationManager {
    pub fn new(
        bus: Arc<MessageBus>,
        balancer: Arc<LoadBalancer>,
        registry: Arc<TaskRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_timeout_minutes(bus, balancer, registry, clock, DEFAULT_TIMEOUT_MINUTES)
    }

    pub fn with_timeout_minutes(
        bus: Arc<MessageBus>,
        balancer: Arc<LoadBalancer>,
        registry: Arc<TaskRegistry>,
        clock: Arc<dyn Clock>,
        timeout_minutes: i64,
    ) -> Self {
        Self {
            bus,
            balancer,
            registry,
            clock,
            workers: DashMap::new(),
            sessions: DashMap::new(),
            timeout_minutes,
            metrics: CollabMetrics::new(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn metrics(&self) -> &CollabMetrics {
        &self.metrics
    }

    // -- worker lifecycle -------------------------------------------------

    pub fn register_worker(
        &self,
        worker_id: &str,
        worker_type: &str,
        capabilities: HashSet<String>,
        capacity: u32,
        specialties: HashSet<String>,
    ) {
        let now = self.now();
        self.workers.insert(
            worker_id.to_string(),
            WorkerRecord::new(worker_id, worker_type, capabilities, now),
        );
        self.balancer.register_worker(worker_id, capacity, specialties);
        self.bus.register_worker(worker_id);
        info!(worker_id, "worker registered");
    }

    /// Reassigns every active task of `worker_id` by the fresh-assignment
    /// path, preserving priority; tasks that cannot be reassigned are
    /// marked failed with `worker_lost` (spec §4.4).
    pub fn unregister_worker(&self, worker_id: &str) {
        let now = self.now();
        for task in self.registry.active_tasks_for_worker(worker_id) {
            self.reassign_or_lose(&task, worker_id, now);
        }
        self.workers.remove(worker_id);
        self.balancer.remove_worker(worker_id);
        self.bus.unregister_worker(worker_id);
        info!(worker_id, "worker unregistered");
    }

    fn reassign_or_lose(&self, task: &TaskAssignment, losing_worker: &str, now: DateTime<Utc>) {
        let candidates = self.online_worker_ids_excluding(losing_worker);
        match self.balancer.select_worker(&task.task_type, &candidates) {
            Some(new_worker) => {
                if let Some(reassigned) =
                    self.registry.reassign(task.task_id, &new_worker, task.priority, now)
                {
                    self.balancer.increment_load(&new_worker);
                    self.send_task_assignment(&reassigned);
                    debug!(task_id = %task.task_id, new_worker, "task reassigned after worker loss");
                }
            }
            None => {
                let _ = self.registry.fail(
                    task.task_id,
                    CoreError::worker_lost(format!("no worker available to replace {losing_worker}")),
                    now,
                );
                self.metrics.workers_lost.inc();
                warn!(task_id = %task.task_id, losing_worker, "task failed: worker_lost");
            }
        }
    }

    pub fn heartbeat(&self, worker_id: &str) {
        let now = self.now();
        if let Some(mut worker) = self.workers.get_mut(worker_id) {
            worker.last_heartbeat = now;
            worker.status = WorkerStatus::Online;
        }
    }

    /// Marks workers whose last heartbeat predates `timeout_minutes` as
    /// offline and reassigns their active tasks (spec §4.4 cleanup
    /// routine). Returns the ids marked offline this pass.
    pub fn cleanup_stale_workers(&self) -> Vec<String> {
        let now = self.now();
        let threshold = Duration::minutes(self.timeout_minutes);
        let mut gone = Vec::new();
        for mut entry in self.workers.iter_mut() {
            if entry.is_online() && now - entry.last_heartbeat > threshold {
                entry.status = WorkerStatus::Offline;
                gone.push(entry.worker_id.clone());
            }
        }
        for worker_id in &gone {
            for task in self.registry.active_tasks_for_worker(worker_id) {
                self.reassign_or_lose(&task, worker_id, now);
            }
            warn!(worker_id, "worker marked offline by heartbeat cleanup");
        }
        gone
    }

    fn online_worker_ids_excluding(&self, excluded: &str) -> Vec<String> {
        self.workers
            .iter()
            .filter(|w| w.is_online() && w.worker_id != excluded)
            .map(|w| w.worker_id.clone())
            .collect()
    }

    fn online_worker_ids(&self) -> Vec<String> {
        self.workers
            .iter()
            .filter(|w| w.is_online())
            .map(|w| w.worker_id.clone())
            .collect()
    }

    fn is_online(&self, worker_id: &str) -> bool {
        self.workers.get(worker_id).map(|w| w.is_online()).unwrap_or(false)
    }

    fn send_task_assignment(&self, task: &TaskAssignment) {
        let mut content = HashMap::new();
        content.insert("task_id".to_string(), json!(task.task_id));
        content.insert("task_type".to_string(), json!(task.task_type));
        content.insert("task_data".to_string(), task.task_data.clone());
        let message = Message::new(
            "collaboration_manager",
            &task.worker_id,
            MessageType::TaskAssignment,
            content,
            task.priority,
            self.now(),
        );
        self.bus.send(message);
    }

    // -- task dispatch ------------------------------------------------------

    /// `assign_task` (spec §4.4). Returns `None` when no worker is
    /// available; the caller may retry later.
    pub fn assign_task(
        &self,
        task_type: &str,
        task_data: Value,
        preferred_worker: Option<&str>,
        priority: i32,
    ) -> Option<TaskAssignment> {
        let worker_id = match preferred_worker {
            Some(id) if self.is_online(id) => id.to_string(),
            _ => {
                let candidates = self.online_worker_ids();
                self.balancer.select_worker(task_type, &candidates)?
            }
        };

        let now = self.now();
        let task = self.registry.create(&worker_id, task_type, task_data, priority, now);
        self.balancer.increment_load(&worker_id);
        self.send_task_assignment(&task);
        self.metrics.tasks_assigned.inc();
        Some(task)
    }

    fn execution_time_secs(task: &TaskAssignment, now: DateTime<Utc>) -> f64 {
        let started = task.started_at.unwrap_or(task.assigned_at);
        (now - started).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// `complete_task` (spec §4.4). Errors if `worker_id` is not the
    /// task's assignee.
    pub fn complete_task(
        &self,
        task_id: Uuid,
        result: Value,
        worker_id: &str,
    ) -> CoreResult<DependencyFanout> {
        let task = self
            .registry
            .get(task_id)
            .ok_or_else(|| CoreError::validation(format!("unknown task {task_id}")))?;
        if task.worker_id != worker_id {
            return Err(CoreError::validation(format!(
                "{worker_id} is not the assignee of {task_id}"
            )));
        }
        let now = self.now();
        self.balancer
            .record_completion(worker_id, Self::execution_time_secs(&task, now), true);
        let fanout = self
            .registry
            .complete(task_id, result, now)
            .ok_or_else(|| CoreError::internal("task vanished during completion"))?;

        for unblocked_id in &fanout.unblocked {
            if let Some(unblocked) = self.registry.get(*unblocked_id) {
                self.balancer.increment_load(&unblocked.worker_id);
                self.send_task_assignment(&unblocked);
            }
        }
        self.metrics.tasks_completed.inc();
        Ok(fanout)
    }

    /// `fail_task` (spec §4.4): applies the retry policy — typed
    /// `Timeout`/`Network` errors under two prior retries are re-assigned
    /// with `priority + 1` rather than surfaced.
    pub fn fail_task(&self, task_id: Uuid, error: CoreError, worker_id: &str) -> CoreResult<FailOutcome> {
        let task = self
            .registry
            .get(task_id)
            .ok_or_else(|| CoreError::validation(format!("unknown task {task_id}")))?;
        if task.worker_id != worker_id {
            return Err(CoreError::validation(format!(
                "{worker_id} is not the assignee of {task_id}"
            )));
        }
        let now = self.now();
        self.balancer
            .record_completion(worker_id, Self::execution_time_secs(&task, now), false);

        let retryable = matches!(error.kind, ErrorKind::Timeout | ErrorKind::Network);
        if retryable && task.retry_count < MAX_AUTO_RETRIES {
            let candidates = self.online_worker_ids_excluding(worker_id);
            if let Some(new_worker) = self.balancer.select_worker(&task.task_type, &candidates) {
                let new_priority = task.priority + 1;
                if let Some(reassigned) =
                    self.registry.reassign(task_id, &new_worker, new_priority, now)
                {
                    self.balancer.increment_load(&new_worker);
                    self.send_task_assignment(&reassigned);
                    self.metrics.tasks_retried.inc();
                    debug!(task_id = %task_id, new_worker, "task retried");
                    return Ok(FailOutcome::Retried { new_worker_id: new_worker, new_priority });
                }
            }
        }

        let fanout = self
            .registry
            .fail(task_id, error, now)
            .ok_or_else(|| CoreError::internal("task vanished during failure"))?;
        let mut content = HashMap::new();
        content.insert("task_id".to_string(), json!(task_id));
        self.bus.send(Message::new(
            "collaboration_manager",
            worker_id,
            MessageType::TaskFailed,
            content,
            task.priority,
            now,
        ));
        self.metrics.tasks_failed.inc();
        Ok(FailOutcome::Surfaced(fanout))
    }

    // -- collaboration sessions ----------------------------------------------

    pub fn start_collaboration(
        &self,
        collaboration_type: &str,
        participants: Vec<String>,
        context: Value,
    ) -> Uuid {
        let now = self.now();
        let session = CollaborationSession::new(collaboration_type, participants.clone(), context.clone(), now);
        let collaboration_id = session.collaboration_id;
        self.sessions.insert(collaboration_id, session);

        let mut content = HashMap::new();
        content.insert("collaboration_id".to_string(), json!(collaboration_id));
        content.insert("collaboration_type".to_string(), json!(collaboration_type));
        content.insert("context".to_string(), context);
        for participant in &participants {
            self.bus.send(Message::new(
                "collaboration_manager",
                participant,
                MessageType::CollaborationStart,
                content.clone(),
                0,
                now,
            ));
        }
        collaboration_id
    }

    pub fn end_collaboration(&self, collaboration_id: Uuid, result: Value) -> CoreResult<()> {
        let mut session = self
            .sessions
            .get_mut(&collaboration_id)
            .ok_or_else(|| CoreError::validation(format!("unknown collaboration {collaboration_id}")))?;
        let now = self.now();
        session.ended_at = Some(now);
        session.result = Some(result.clone());
        let participants = session.participants.clone();
        drop(session);

        let mut content = HashMap::new();
        content.insert("collaboration_id".to_string(), json!(collaboration_id));
        content.insert("result".to_string(), result);
        for participant in &participants {
            self.bus.send(Message::new(
                "collaboration_manager",
                participant,
                MessageType::CollaborationEnd,
                content.clone(),
                0,
                now,
            ));
        }
        Ok(())
    }

    /// Writes into a session's shared data and fans the update out to the
    /// other participants as a `data_share` message (spec §4.4).
    pub fn share_data(&self, collaboration_id: Uuid, sender_id: &str, key: &str, value: Value) -> CoreResult<()> {
        let mut session = self
            .sessions
            .get_mut(&collaboration_id)
            .ok_or_else(|| CoreError::validation(format!("unknown collaboration {collaboration_id}")))?;
        if !session.is_active() {
            return Err(CoreError::validation("collaboration has already ended"));
        }
        if let Value::Object(map) = &mut session.shared_data {
            map.insert(key.to_string(), value.clone());
        }
        let participants = session.participants.clone();
        drop(session);

        let now = self.now();
        let mut content = HashMap::new();
        content.insert("collaboration_id".to_string(), json!(collaboration_id));
        content.insert("key".to_string(), json!(key));
        content.insert("value".to_string(), value);
        for participant in participants.iter().filter(|p| p.as_str() != sender_id) {
            self.bus.send(Message::new(
                sender_id,
                participant,
                MessageType::DataShare,
                content.clone(),
                0,
                now,
            ));
        }
        Ok(())
    }

    pub fn session(&self, collaboration_id: Uuid) -> Option<CollaborationSession> {
        self.sessions.get(&collaboration_id).map(|s| s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::fakes::FixedClock;
    use serde_json::json;
    use std::collections::HashSet;

    fn set(tags: &[&str]) -> HashSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    fn manager() -> CollaborationManager {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        CollaborationManager::new(
            Arc::new(MessageBus::new(clock.clone())),
            Arc::new(LoadBalancer::new()),
            Arc::new(TaskRegistry::new()),
            clock,
        )
    }

    #[test]
    fn assign_task_picks_least_loaded_online_worker() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&["search"]));
        let task = mgr.assign_task("search", json!({}), None, 0).unwrap();
        assert_eq!(task.worker_id, "w1");
        assert_eq!(mgr.balancer.load("w1"), Some(1));
    }

    #[test]
    fn assign_task_returns_none_with_no_workers() {
        let mgr = manager();
        assert!(mgr.assign_task("search", json!({}), None, 0).is_none());
    }

    #[test]
    fn complete_task_rejects_non_assignee() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&["search"]));
        let task = mgr.assign_task("search", json!({}), None, 0).unwrap();
        let result = mgr.complete_task(task.task_id, json!({}), "someone_else");
        assert!(result.is_err());
    }

    #[test]
    fn fail_task_retries_timeout_then_surfaces_after_two() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&["search"]));
        mgr.register_worker("w2", "search", set(&[]), 5, set(&["search"]));
        let task = mgr.assign_task("search", json!({}), Some("w1"), 0).unwrap();

        let outcome1 = mgr.fail_task(task.task_id, CoreError::timeout("slow"), "w1").unwrap();
        let (new_worker, retried_priority) = match outcome1 {
            FailOutcome::Retried { new_worker_id, new_priority } => (new_worker_id, new_priority),
            FailOutcome::Surfaced(_) => panic!("expected retry"),
        };
        assert_eq!(retried_priority, 1);

        let outcome2 = mgr.fail_task(task.task_id, CoreError::timeout("slow"), &new_worker).unwrap();
        assert!(matches!(outcome2, FailOutcome::Retried { .. }));

        // third failure exceeds MAX_AUTO_RETRIES (2 prior retries already recorded)
        let refreshed = mgr.registry.get(task.task_id).unwrap();
        let outcome3 = mgr.fail_task(task.task_id, CoreError::timeout("slow"), &refreshed.worker_id).unwrap();
        assert!(matches!(outcome3, FailOutcome::Surfaced(_)));
    }

    #[test]
    fn fail_task_surfaces_non_retryable_kind_immediately() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&["search"]));
        let task = mgr.assign_task("search", json!({}), Some("w1"), 0).unwrap();
        let outcome = mgr
            .fail_task(task.task_id, CoreError::validation("bad input"), "w1")
            .unwrap();
        assert!(matches!(outcome, FailOutcome::Surfaced(_)));
    }

    #[test]
    fn unregister_worker_reassigns_active_tasks() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&["search"]));
        mgr.register_worker("w2", "search", set(&[]), 5, set(&["search"]));
        let task = mgr.assign_task("search", json!({}), Some("w1"), 3).unwrap();
        mgr.unregister_worker("w1");
        let reassigned = mgr.registry.get(task.task_id).unwrap();
        assert_eq!(reassigned.worker_id, "w2");
        assert_eq!(reassigned.priority, 3);
    }

    #[test]
    fn unregister_worker_marks_worker_lost_with_no_replacement() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&["search"]));
        let task = mgr.assign_task("search", json!({}), Some("w1"), 0).unwrap();
        mgr.unregister_worker("w1");
        let failed = mgr.registry.get(task.task_id).unwrap();
        assert_eq!(failed.error.unwrap().kind, patentflow_common::ErrorKind::WorkerLost);
    }

    #[test]
    fn collaboration_lifecycle_round_trips() {
        let mgr = manager();
        mgr.register_worker("w1", "search", set(&[]), 5, set(&[]));
        mgr.register_worker("w2", "search", set(&[]), 5, set(&[]));
        let collab_id = mgr.start_collaboration("joint_review", vec!["w1".into(), "w2".into()], json!({}));
        mgr.share_data(collab_id, "w1", "progress", json!(0.5)).unwrap();
        let session = mgr.session(collab_id).unwrap();
        assert_eq!(session.shared_data["progress"], json!(0.5));
        mgr.end_collaboration(collab_id, json!({"status": "done"})).unwrap();
        assert!(!mgr.session(collab_id).unwrap().is_active());
    }
}
