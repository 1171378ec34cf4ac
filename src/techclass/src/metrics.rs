//! Prometheus metrics for the technology classifier (ambient stack).

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

pub struct TechClassifierMetrics {
    registry: Registry,
    pub analyses_run: Counter,
    pub analyses_failed: Counter,
    pub processing_time: Histogram,
}

impl TechClassifierMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let analyses_run = Counter::new("techclass_analyses_total", "completed technology classifications").unwrap();
        let analyses_failed =
            Counter::new("techclass_analyses_failed_total", "technology classifications that returned an error").unwrap();
        let processing_time = Histogram::with_opts(HistogramOpts::new(
            "techclass_analysis_duration_seconds",
            "wall-clock time spent inside classify()",
        ))
        .unwrap();
        registry.register(Box::new(analyses_run.clone())).unwrap();
        registry.register(Box::new(analyses_failed.clone())).unwrap();
        registry.register(Box::new(processing_time.clone())).unwrap();
        Self { registry, analyses_run, analyses_failed, processing_time }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record(&self, succeeded: bool, elapsed_secs: f64) {
        self.processing_time.observe(elapsed_secs);
        if succeeded {
            self.analyses_run.inc();
        } else {
            self.analyses_failed.inc();
        }
    }
}

impl Default for TechClassifierMetrics {
    fn default() -> Self {
        Self::new()
    }
}
