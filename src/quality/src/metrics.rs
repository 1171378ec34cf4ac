//! Prometheus metrics for the analysis quality controller (ambient stack).

use prometheus::{Counter, Gauge, Histogram, HistogramOpts, Registry};

pub struct AnalysisQualityControllerMetrics {
    registry: Registry,
    pub validations_run: Counter,
    pub validations_failed: Counter,
    pub processing_time: Histogram,
    pub pass_rate: Gauge,
}

impl AnalysisQualityControllerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let validations_run = Counter::new("quality_validations_total", "completed analysis-quality validations").unwrap();
        let validations_failed =
            Counter::new("quality_validations_failed_total", "analysis-quality validations that errored").unwrap();
        let processing_time = Histogram::with_opts(HistogramOpts::new(
            "quality_validation_duration_seconds",
            "wall-clock time spent inside validate()",
        ))
        .unwrap();
        let pass_rate = Gauge::new("quality_validation_pass_rate", "rolling fraction of validations meeting the pass threshold").unwrap();
        registry.register(Box::new(validations_run.clone())).unwrap();
        registry.register(Box::new(validations_failed.clone())).unwrap();
        registry.register(Box::new(processing_time.clone())).unwrap();
        registry.register(Box::new(pass_rate.clone())).unwrap();
        Self { registry, validations_run, validations_failed, processing_time, pass_rate }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record(&self, passed: bool, elapsed_secs: f64) {
        self.processing_time.observe(elapsed_secs);
        self.validations_run.inc();
        if !passed {
            self.validations_failed.inc();
        }
        let total = self.validations_run.get();
        let passes = total - self.validations_failed.get();
        if total > 0.0 {
            self.pass_rate.set(passes / total);
        }
    }
}

impl Default for AnalysisQualityControllerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
