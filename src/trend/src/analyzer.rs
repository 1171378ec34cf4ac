//! Wires preprocessing, counting, regression, prediction, confidence,
//! direction, seasonality, and outlier detection into the single
//! `analyze` entry point the orchestrator calls (spec §4.6).

use crate::{confidence, counts, direction, outliers, predictions, preprocessing, regression, seasonality};
use patentflow_common::{CoreResult, PatentRecord, TrendResult};
use tracing::info;

use crate::metrics::TrendAnalyzerMetrics;

/// Tunables spec §4.6 pins as defaults: moving-average window and
/// prediction horizon.
#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzerConfig {
    pub smoothing_window: usize,
    pub prediction_years: usize,
}

impl Default for TrendAnalyzerConfig {
    fn default() -> Self {
        Self { smoothing_window: 3, prediction_years: 3 }
    }
}

pub struct TrendAnalyzer {
    config: TrendAnalyzerConfig,
    metrics: TrendAnalyzerMetrics,
}

impl TrendAnalyzer {
    pub fn new(config: TrendAnalyzerConfig) -> Self {
        Self { config, metrics: TrendAnalyzerMetrics::new() }
    }

    pub fn metrics(&self) -> &TrendAnalyzerMetrics {
        &self.metrics
    }

    pub fn analyze(&self, records: &[PatentRecord]) -> CoreResult<TrendResult> {
        let started = std::time::Instant::now();
        let result = self.analyze_inner(records);
        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.record(result.is_ok(), elapsed);
        if let Err(err) = &result {
            info!(error = %err, "trend analysis returned insufficient_data");
        }
        result
    }

    fn analyze_inner(&self, records: &[PatentRecord]) -> CoreResult<TrendResult> {
        let points = preprocessing::preprocess(records)?;
        let tallies = counts::tally(&points);

        let moving_average = counts::moving_average(&tallies.yearly, self.config.smoothing_window);
        let growth_rates = counts::growth_rates(&tallies.yearly);

        let mut years: Vec<i32> = tallies.yearly.keys().copied().collect();
        years.sort_unstable();
        let yearly_series: Vec<f64> = years.iter().map(|y| tallies.yearly[y] as f64).collect();
        let fit = regression::linear_fit(&yearly_series);

        let cagr = regression::cagr(&tallies.yearly);
        let pattern = regression::classify_pattern(&growth_rates);

        let methods = vec![
            predictions::linear(&tallies.yearly, self.config.prediction_years),
            predictions::moving_average(&tallies.yearly, self.config.smoothing_window, self.config.prediction_years),
            predictions::exponential_smoothing(&tallies.yearly, self.config.prediction_years),
            predictions::seasonal(&tallies.yearly, self.config.prediction_years),
        ];
        let (ensemble_predictions, prediction_spread) = predictions::ensemble(&methods);

        let confidence_factors = confidence::assess(&tallies.yearly, &methods);
        let overall_confidence = confidence_factors.overall();
        let confidence_grade = confidence::grade(overall_confidence);

        let recent_growth = direction::recent(&growth_rates, 3);
        let direction_result = direction::analyze(&recent_growth, &pattern, cagr);

        let seasonality_coefficient = seasonality::coefficient_of_variation(&points);
        let seasonality_present = seasonality::is_present(seasonality_coefficient);

        let trend_outliers = outliers::detect(&tallies.yearly);

        Ok(TrendResult {
            yearly_counts: tallies.yearly,
            monthly_counts: tallies.monthly,
            quarterly_counts: tallies.quarterly,
            moving_average,
            growth_rates,
            trend_slope: fit.slope,
            trend_r: fit.r,
            direction: direction_result.direction,
            direction_confidence: direction_result.confidence,
            direction_strength: direction_result.strength,
            cagr,
            pattern,
            predictions: ensemble_predictions,
            prediction_spread,
            confidence: overall_confidence,
            confidence_grade: confidence_grade.to_string(),
            seasonality_present,
            seasonality_coefficient,
            outliers: trend_outliers,
            total_records: points.len(),
        })
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(TrendAnalyzerConfig::default())
    }
}
