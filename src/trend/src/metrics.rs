//! Prometheus metrics for the trend analyzer (ambient stack), mirroring
//! `trend_analyzer.py`'s small rolling `performance_metrics` record
//! (spec SPEC_FULL §4.6 supplement) but backed by a real registry
//! instead of an in-process dict.

use prometheus::{Counter, Gauge, Histogram, HistogramOpts, Registry};

pub struct TrendAnalyzerMetrics {
    registry: Registry,
    pub analyses_run: Counter,
    pub analyses_failed: Counter,
    pub processing_time: Histogram,
    pub success_rate: Gauge,
}

impl TrendAnalyzerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let analyses_run = Counter::new("trend_analyses_total", "completed trend analyses").unwrap();
        let analyses_failed = Counter::new("trend_analyses_failed_total", "trend analyses that returned an error").unwrap();
        let processing_time = Histogram::with_opts(HistogramOpts::new(
            "trend_analysis_duration_seconds",
            "wall-clock time spent inside analyze()",
        ))
        .unwrap();
        let success_rate = Gauge::new("trend_analysis_success_rate", "rolling fraction of successful analyses").unwrap();
        registry.register(Box::new(analyses_run.clone())).unwrap();
        registry.register(Box::new(analyses_failed.clone())).unwrap();
        registry.register(Box::new(processing_time.clone())).unwrap();
        registry.register(Box::new(success_rate.clone())).unwrap();
        Self {
            registry,
            analyses_run,
            analyses_failed,
            processing_time,
            success_rate,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Updates the rolling success-rate gauge after a call completes.
    pub fn record(&self, succeeded: bool, elapsed_secs: f64) {
        self.processing_time.observe(elapsed_secs);
        if succeeded {
            self.analyses_run.inc();
        } else {
            self.analyses_failed.inc();
        }
        let total = self.analyses_run.get() + self.analyses_failed.get();
        if total > 0.0 {
            self.success_rate.set(self.analyses_run.get() / total);
        }
    }
}

impl Default for TrendAnalyzerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
