//! Prometheus metrics for the message bus, following the
//! one-registry-per-component convention the platform workspace uses in
//! `layer2::metrics::PlanningMetrics`.

use prometheus::{Counter, Registry};

pub struct BusMetrics {
    pub registry: Registry,
    pub sent: Counter,
    pub received: Counter,
}

impl BusMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let sent = Counter::new("bus_messages_sent_total", "Total messages sent").unwrap();
        let received =
            Counter::new("bus_messages_received_total", "Total messages received").unwrap();
        let _ = registry.register(Box::new(sent.clone()));
        let _ = registry.register(Box::new(received.clone()));
        Self {
            registry,
            sent,
            received,
        }
    }
}

impl Default for BusMetrics {
    fn default() -> Self {
        Self::new()
    }
}
