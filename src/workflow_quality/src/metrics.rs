//! Prometheus metrics for the workflow quality controller (ambient stack).

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

pub struct WorkflowQualityControllerMetrics {
    registry: Registry,
    pub checks_run: Counter,
    pub checks_failed: Counter,
    pub alerts_fired: Counter,
    pub check_duration: Histogram,
}

impl WorkflowQualityControllerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let checks_run = Counter::new("workflow_quality_checks_total", "completed quality checks").unwrap();
        let checks_failed = Counter::new("workflow_quality_checks_failed_total", "quality checks that scored below threshold").unwrap();
        let alerts_fired = Counter::new("workflow_quality_alerts_total", "alerts fired by the controller").unwrap();
        let check_duration = Histogram::with_opts(HistogramOpts::new(
            "workflow_quality_check_duration_seconds",
            "wall-clock time spent evaluating a quality check",
        ))
        .unwrap();
        registry.register(Box::new(checks_run.clone())).unwrap();
        registry.register(Box::new(checks_failed.clone())).unwrap();
        registry.register(Box::new(alerts_fired.clone())).unwrap();
        registry.register(Box::new(check_duration.clone())).unwrap();
        Self { registry, checks_run, checks_failed, alerts_fired, check_duration }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record(&self, passed: bool, alerts: usize, elapsed_secs: f64) {
        self.check_duration.observe(elapsed_secs);
        self.checks_run.inc();
        if !passed {
            self.checks_failed.inc();
        }
        self.alerts_fired.inc_by(alerts as f64);
    }
}

impl Default for WorkflowQualityControllerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
