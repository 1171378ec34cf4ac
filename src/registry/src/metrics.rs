//! Prometheus metrics for the task registry (spec §4.3 ambient stack),
//! following `patentflow_bus::BusMetrics`'s layout.

use prometheus::{Counter, Registry};

pub struct RegistryMetrics {
    registry: Registry,
    pub tasks_created: Counter,
    pub tasks_completed: Counter,
    pub tasks_failed: Counter,
    pub tasks_reassigned: Counter,
    pub dependents_unblocked: Counter,
    pub dependents_cascaded_failed: Counter,
}

impl RegistryMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let tasks_created =
            Counter::new("registry_tasks_created_total", "tasks created (assigned or waiting_for_dependency)").unwrap();
        let tasks_completed =
            Counter::new("registry_tasks_completed_total", "tasks moved to completed with a result").unwrap();
        let tasks_failed =
            Counter::new("registry_tasks_failed_total", "tasks moved to completed as failed").unwrap();
        let tasks_reassigned =
            Counter::new("registry_tasks_reassigned_total", "active tasks reassigned to a new worker").unwrap();
        let dependents_unblocked = Counter::new(
            "registry_dependents_unblocked_total",
            "waiting_for_dependency tasks unblocked by a completion",
        )
        .unwrap();
        let dependents_cascaded_failed = Counter::new(
            "registry_dependents_cascaded_failed_total",
            "dependent tasks cascaded to dependency_failed",
        )
        .unwrap();
        registry.register(Box::new(tasks_created.clone())).unwrap();
        registry.register(Box::new(tasks_completed.clone())).unwrap();
        registry.register(Box::new(tasks_failed.clone())).unwrap();
        registry.register(Box::new(tasks_reassigned.clone())).unwrap();
        registry.register(Box::new(dependents_unblocked.clone())).unwrap();
        registry.register(Box::new(dependents_cascaded_failed.clone())).unwrap();
        Self {
            registry,
            tasks_created,
            tasks_completed,
            tasks_failed,
            tasks_reassigned,
            dependents_unblocked,
            dependents_cascaded_failed,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for RegistryMetrics {
    fn default() -> Self {
        Self::new()
    }
}
