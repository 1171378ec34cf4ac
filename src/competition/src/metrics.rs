//! Prometheus metrics for the competition analyzer (ambient stack).

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

pub struct CompetitionAnalyzerMetrics {
    registry: Registry,
    pub analyses_run: Counter,
    pub analyses_failed: Counter,
    pub processing_time: Histogram,
}

impl CompetitionAnalyzerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let analyses_run = Counter::new("competition_analyses_total", "completed competition analyses").unwrap();
        let analyses_failed =
            Counter::new("competition_analyses_failed_total", "competition analyses that returned an error").unwrap();
        let processing_time = Histogram::with_opts(HistogramOpts::new(
            "competition_analysis_duration_seconds",
            "wall-clock time spent inside analyze()",
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

impl Default for CompetitionAnalyzerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
