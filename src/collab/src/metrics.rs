//! Prometheus metrics for the collaboration manager (spec §4.4 ambient
//! stack), following `patentflow_bus::BusMetrics`'s layout.

use prometheus::{Counter, Registry};

pub struct CollabMetrics {
    registry: Registry,
    pub tasks_assigned: Counter,
    pub tasks_completed: Counter,
    pub tasks_failed: Counter,
    pub tasks_retried: Counter,
    pub workers_lost: Counter,
}

impl CollabMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let tasks_assigned =
            Counter::new("collab_tasks_assigned_total", "tasks assigned to a worker").unwrap();
        let tasks_completed =
            Counter::new("collab_tasks_completed_total", "tasks completed successfully").unwrap();
        let tasks_failed = Counter::new("collab_tasks_failed_total", "tasks surfaced as failed").unwrap();
        let tasks_retried = Counter::new("collab_tasks_retried_total", "tasks re-assigned by the retry policy").unwrap();
        let workers_lost = Counter::new("collab_workers_lost_total", "tasks failed with worker_lost").unwrap();
        registry.register(Box::new(tasks_assigned.clone())).unwrap();
        registry.register(Box::new(tasks_completed.clone())).unwrap();
        registry.register(Box::new(tasks_failed.clone())).unwrap();
        registry.register(Box::new(tasks_retried.clone())).unwrap();
        registry.register(Box::new(workers_lost.clone())).unwrap();
        Self {
            registry,
            tasks_assigned,
            tasks_completed,
            tasks_failed,
            tasks_retried,
            workers_lost,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for CollabMetrics {
    fn default() -> Self {
        Self::new()
    }
}
