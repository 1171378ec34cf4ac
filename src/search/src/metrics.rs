//! Prometheus metrics for the search aggregator (ambient stack).

use prometheus::{Counter, Registry};

pub struct SearchMetrics {
    registry: Registry,
    pub searches_run: Counter,
    pub emergency_fallbacks: Counter,
    pub degraded_searches: Counter,
    pub failovers: Counter,
}

impl SearchMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let searches_run = Counter::new("search_runs_total", "aggregate search() calls").unwrap();
        let emergency_fallbacks =
            Counter::new("search_emergency_fallbacks_total", "runs that hit the emergency fallback path").unwrap();
        let degraded_searches =
            Counter::new("search_degraded_total", "per-source degraded search invocations").unwrap();
        let failovers = Counter::new("search_failovers_total", "per-source failover attempts").unwrap();
        registry.register(Box::new(searches_run.clone())).unwrap();
        registry.register(Box::new(emergency_fallbacks.clone())).unwrap();
        registry.register(Box::new(degraded_searches.clone())).unwrap();
        registry.register(Box::new(failovers.clone())).unwrap();
        Self {
            registry,
            searches_run,
            emergency_fallbacks,
            degraded_searches,
            failovers,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
