//! Task lifecycle bookkeeping (spec §4.3, §8 invariant 1).
//!
//! `active`/`completed` are disjoint `DashMap`s keyed by `task_id`, giving
//! per-task atomicity without a global lock — a task is always in
//! exactly one of the two maps.

use crate::metrics::RegistryMetrics;
use crate::types::{TaskAssignment, TaskStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use patentflow_common::CoreError;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// Outcome of completing or failing a task: which previously-blocked
/// dependents became runnable or were cascaded to failure.
#[derive(Debug, Default)]
pub struct DependencyFanout {
    pub unblocked: Vec<Uuid>,
    pub cascaded_failures: Vec<Uuid>,
}

#[derive(Default)]
pub struct TaskRegistry {
    active: DashMap<Uuid, TaskAssignment>,
    completed: DashMap<Uuid, TaskAssignment>,
    /// dependency task_id -> dependent task ids waiting on it
    dependents: DashMap<Uuid, Vec<Uuid>>,
    metrics: RegistryMetrics,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    pub fn create(
        &self,
        worker_id: &str,
        task_type: &str,
        task_data: Value,
        priority: i32,
        now: DateTime<Utc>,
    ) -> TaskAssignment {
        let task = TaskAssignment::new(worker_id, task_type, task_data, priority, now);
        self.active.insert(task.task_id, task.clone());
        self.metrics.tasks_created.inc();
        task
    }

    /// `await_dependency` (spec §4.3): creates a task in
    /// `waiting_for_dependency`, recording `depends_on`.
    pub fn await_dependency(
        &self,
        worker_id: &str,
        task_type: &str,
        task_data: Value,
        priority: i32,
        depends_on: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> TaskAssignment {
        let mut task = TaskAssignment::new(worker_id, task_type, task_data, priority, now);
        task.status = TaskStatus::WaitingForDependency;
        task.depends_on = depends_on.clone();
        self.active.insert(task.task_id, task.clone());
        for dep in depends_on {
            self.dependents.entry(dep).or_default().push(task.task_id);
        }
        self.metrics.tasks_created.inc();
        task
    }

    pub fn get(&self, task_id: Uuid) -> Option<TaskAssignment> {
        self.active
            .get(&task_id)
            .map(|t| t.clone())
            .or_else(|| self.completed.get(&task_id).map(|t| t.clone()))
    }

    pub fn is_active(&self, task_id: Uuid) -> bool {
        self.active.contains_key(&task_id)
    }

    pub fn start(&self, task_id: Uuid, now: DateTime<Utc>) -> Option<TaskAssignment> {
        let mut entry = self.active.get_mut(&task_id)?;
        if entry.status != TaskStatus::Assigned {
            return None;
        }
        entry.status = TaskStatus::Running;
        entry.started_at = Some(now);
        Some(entry.clone())
    }

    /// `complete(result)` (spec §4.3): moves the task to `completed` and
    /// unblocks any dependents whose every dependency is now complete.
    pub fn complete(
        &self,
        task_id: Uuid,
        result: Value,
        now: DateTime<Utc>,
    ) -> Option<DependencyFanout> {
        let mut task = self.active.remove(&task_id)?.1;
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);
        task.result = Some(result);
        self.completed.insert(task_id, task);
        self.metrics.tasks_completed.inc();

        let mut fanout = DependencyFanout::default();
        if let Some((_, waiters)) = self.dependents.remove(&task_id) {
            for waiter_id in waiters {
                if self.all_dependencies_completed(waiter_id) {
                    if let Some(mut waiter) = self.active.get_mut(&waiter_id) {
                        if waiter.status == TaskStatus::WaitingForDependency {
                            waiter.status = TaskStatus::Assigned;
                            fanout.unblocked.push(waiter_id);
                            self.metrics.dependents_unblocked.inc();
                        }
                    }
                }
            }
        }
        Some(fanout)
    }

    fn all_dependencies_completed(&self, task_id: Uuid) -> bool {
        let Some(task) = self.active.get(&task_id) else {
            return false;
        };
        task.depends_on
            .iter()
            .all(|dep| self.completed.get(dep).map(|t| t.status == TaskStatus::Completed).unwrap_or(false))
    }

    /// `fail(error)` (spec §4.3): moves the task to `completed` as
    /// `failed` and cascades `dependency_failed` to every direct and
    /// transitive dependent.
    pub fn fail(&self, task_id: Uuid, error: CoreError, now: DateTime<Utc>) -> Option<DependencyFanout> {
        let mut task = self.active.remove(&task_id)?.1;
        task.status = TaskStatus::Failed;
        task.completed_at = Some(now);
        task.error = Some(error);
        self.completed.insert(task_id, task);
        self.metrics.tasks_failed.inc();

        let mut fanout = DependencyFanout::default();
        let mut frontier = vec![task_id];
        let mut seen: HashSet<Uuid> = HashSet::new();
        while let Some(failed_id) = frontier.pop() {
            let Some((_, waiters)) = self.dependents.remove(&failed_id) else {
                continue;
            };
            for waiter_id in waiters {
                if !seen.insert(waiter_id) {
                    continue;
                }
                if let Some((_, mut waiter)) = self.active.remove(&waiter_id) {
                    waiter.status = TaskStatus::Failed;
                    waiter.completed_at = Some(now);
                    waiter.error = Some(CoreError::dependency_failed(format!(
                        "dependency {failed_id} failed"
                    )));
                    self.completed.insert(waiter_id, waiter);
                    fanout.cascaded_failures.push(waiter_id);
                    self.metrics.dependents_cascaded_failed.inc();
                    frontier.push(waiter_id);
                }
            }
        }
        Some(fanout)
    }

    /// Re-assigns an active task to a different worker without closing
    /// its lifecycle, for C4's retry policy (spec §4.4) and worker-loss
    /// reassignment (spec §4.4 `unregister_worker`/heartbeat cleanup).
    pub fn reassign(
        &self,
        task_id: Uuid,
        new_worker_id: &str,
        new_priority: i32,
        now: DateTime<Utc>,
    ) -> Option<TaskAssignment> {
        let mut task = self.active.get_mut(&task_id)?;
        task.worker_id = new_worker_id.to_string();
        task.priority = new_priority;
        task.status = TaskStatus::Assigned;
        task.assigned_at = now;
        task.started_at = None;
        task.retry_count += 1;
        self.metrics.tasks_reassigned.inc();
        Some(task.clone())
    }

    pub fn increment_retry(&self, task_id: Uuid) -> u32 {
        if let Some(mut task) = self.active.get_mut(&task_id) {
            task.retry_count += 1;
            return task.retry_count;
        }
        0
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn active_tasks_for_worker(&self, worker_id: &str) -> Vec<TaskAssignment> {
        self.active
            .iter()
            .filter(|e| e.worker_id == worker_id)
            .map(|e| e.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_lives_in_exactly_one_map() {
        let registry = TaskRegistry::new();
        let now = Utc::now();
        let task = registry.create("w1", "search", json!({}), 0, now);
        assert!(registry.is_active(task.task_id));
        registry.complete(task.task_id, json!({"ok": true}), now).unwrap();
        assert!(!registry.is_active(task.task_id));
        assert!(registry.get(task.task_id).is_some());
    }

    #[test]
    fn dependent_unblocks_only_when_all_deps_complete() {
        let registry = TaskRegistry::new();
        let now = Utc::now();
        let dep1 = registry.create("w1", "search", json!({}), 0, now);
        let dep2 = registry.create("w1", "search", json!({}), 0, now);
        let waiter = registry.await_dependency(
            "w2",
            "analysis",
            json!({}),
            0,
            vec![dep1.task_id, dep2.task_id],
            now,
        );

        let fanout1 = registry.complete(dep1.task_id, json!({}), now).unwrap();
        assert!(fanout1.unblocked.is_empty());
        assert_eq!(
            registry.get(waiter.task_id).unwrap().status,
            TaskStatus::WaitingForDependency
        );

        let fanout2 = registry.complete(dep2.task_id, json!({}), now).unwrap();
        assert_eq!(fanout2.unblocked, vec![waiter.task_id]);
        assert_eq!(
            registry.get(waiter.task_id).unwrap().status,
            TaskStatus::Assigned
        );
    }

    #[test]
    fn dependency_failure_cascades() {
        let registry = TaskRegistry::new();
        let now = Utc::now();
        let dep = registry.create("w1", "search", json!({}), 0, now);
        let waiter = registry.await_dependency("w2", "analysis", json!({}), 0, vec![dep.task_id], now);

        let fanout = registry
            .fail(dep.task_id, CoreError::network("boom"), now)
            .unwrap();
        assert_eq!(fanout.cascaded_failures, vec![waiter.task_id]);
        let failed = registry.get(waiter.task_id).unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert_eq!(failed.error.unwrap().kind, patentflow_common::ErrorKind::DependencyFailed);
    }

    #[test]
    fn timestamps_ordered_invariant_holds() {
        let registry = TaskRegistry::new();
        let now = Utc::now();
        let task = registry.create("w1", "search", json!({}), 0, now);
        registry.start(task.task_id, now + chrono::Duration::seconds(1));
        let completed_fanout = registry.complete(
            task.task_id,
            json!({}),
            now + chrono::Duration::seconds(2),
        );
        assert!(completed_fanout.is_some());
        let final_task = registry.get(task.task_id).unwrap();
        assert!(final_task.timestamps_are_ordered());
    }
}
