//! Prometheus metrics for the report pipeline (ambient stack).

use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

pub struct ReportPipelineMetrics {
    registry: Registry,
    pub reports_generated: Counter,
    pub reports_failed: Counter,
    pub exports_by_format: CounterVec,
    pub generation_duration: Histogram,
}

impl ReportPipelineMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let reports_generated = Counter::new("report_pipeline_reports_total", "reports successfully generated").unwrap();
        let reports_failed = Counter::new("report_pipeline_reports_failed_total", "report generations that errored").unwrap();
        let exports_by_format = CounterVec::new(
            Opts::new("report_pipeline_exports_total", "exports performed, by format"),
            &["format"],
        )
        .unwrap();
        let generation_duration = Histogram::with_opts(HistogramOpts::new(
            "report_pipeline_generation_duration_seconds",
            "wall-clock time spent generating and exporting one report version",
        ))
        .unwrap();
        registry.register(Box::new(reports_generated.clone())).unwrap();
        registry.register(Box::new(reports_failed.clone())).unwrap();
        registry.register(Box::new(exports_by_format.clone())).unwrap();
        registry.register(Box::new(generation_duration.clone())).unwrap();
        Self { registry, reports_generated, reports_failed, exports_by_format, generation_duration }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_success(&self, formats: &[&str], elapsed_secs: f64) {
        self.generation_duration.observe(elapsed_secs);
        self.reports_generated.inc();
        for format in formats {
            self.exports_by_format.with_label_values(&[format]).inc();
        }
    }

    pub fn record_failure(&self) {
        self.reports_failed.inc();
    }
}

impl Default for ReportPipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
