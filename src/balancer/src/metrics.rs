//! Prometheus metrics for the load balancer (spec §4.2 ambient stack),
//! following `patentflow_bus::BusMetrics`'s layout.

use prometheus::{Counter, Gauge, Registry};

pub struct BalancerMetrics {
    registry: Registry,
    pub workers_registered: Gauge,
    pub selections_made: Counter,
    pub selections_exhausted: Counter,
    pub completions_recorded: Counter,
}

impl BalancerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let workers_registered =
            Gauge::new("balancer_workers_registered", "workers currently tracked by the balancer").unwrap();
        let selections_made =
            Counter::new("balancer_selections_total", "select_worker calls that returned a candidate").unwrap();
        let selections_exhausted = Counter::new(
            "balancer_selections_exhausted_total",
            "select_worker calls where every candidate was at capacity",
        )
        .unwrap();
        let completions_recorded = Counter::new(
            "balancer_completions_recorded_total",
            "record_completion calls (task successes and failures alike)",
        )
        .unwrap();
        registry.register(Box::new(workers_registered.clone())).unwrap();
        registry.register(Box::new(selections_made.clone())).unwrap();
        registry.register(Box::new(selections_exhausted.clone())).unwrap();
        registry.register(Box::new(completions_recorded.clone())).unwrap();
        Self {
            registry,
            workers_registered,
            selections_made,
            selections_exhausted,
            completions_recorded,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for BalancerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
