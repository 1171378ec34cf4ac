//! Performance monitoring (spec §4.10): response time, throughput,
//! error rate, and resource usage, each scored against a threshold
//! with linear decay rather than a bare pass/fail cliff.

use crate::types::{QualityCheckResult, QualityCheckType, QualityMetric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RESPONSE_TIME_THRESHOLD_S: f64 = 30.0;
pub const THROUGHPUT_THRESHOLD_PER_MIN: f64 = 10.0;
pub const ERROR_RATE_THRESHOLD: f64 = 0.05;
pub const RESOURCE_USAGE_THRESHOLD_PCT: f64 = 80.0;

/// A single workflow-run's observed performance (spec §4.10
/// "Performance check").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub response_time_s: f64,
    pub throughput_per_min: f64,
    pub error_rate: f64,
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

/// Score that is 1.0 at/under `threshold`, decays linearly to 0.0 at
/// `2 * threshold`, and is 0.0 beyond that (spec: "linear decay to 2x
/// threshold").
fn decaying_score(value: f64, threshold: f64) -> f64 {
    if value <= threshold {
        1.0
    } else {
        let ceiling = threshold * 2.0;
        (1.0 - (value - threshold) / (ceiling - threshold)).clamp(0.0, 1.0)
    }
}

fn rising_score(value: f64, threshold: f64) -> f64 {
    (value / threshold).clamp(0.0, 1.0)
}

pub fn check(workflow_id: &str, sample: &PerformanceSample, now: DateTime<Utc>) -> QualityCheckResult {
    let mut issues = Vec::new();

    let response_time_score = decaying_score(sample.response_time_s, RESPONSE_TIME_THRESHOLD_S);
    if sample.response_time_s > RESPONSE_TIME_THRESHOLD_S {
        issues.push(format!(
            "response time {:.1}s exceeds the {:.0}s threshold",
            sample.response_time_s, RESPONSE_TIME_THRESHOLD_S
        ));
    }

    let throughput_score = rising_score(sample.throughput_per_min, THROUGHPUT_THRESHOLD_PER_MIN);
    if sample.throughput_per_min < THROUGHPUT_THRESHOLD_PER_MIN {
        issues.push(format!(
            "throughput {:.1}/min is below the {:.0}/min threshold",
            sample.throughput_per_min, THROUGHPUT_THRESHOLD_PER_MIN
        ));
    }

    let error_rate_score = decaying_score(sample.error_rate, ERROR_RATE_THRESHOLD);
    if sample.error_rate > ERROR_RATE_THRESHOLD {
        issues.push(format!(
            "error rate {:.1}% exceeds the {:.0}% threshold",
            sample.error_rate * 100.0,
            ERROR_RATE_THRESHOLD * 100.0
        ));
    }

    let resource_usage = sample.cpu_percent.max(sample.mem_percent);
    let resource_score = decaying_score(resource_usage, RESOURCE_USAGE_THRESHOLD_PCT);
    if resource_usage > RESOURCE_USAGE_THRESHOLD_PCT {
        issues.push(format!(
            "resource usage {resource_usage:.0}% exceeds the {RESOURCE_USAGE_THRESHOLD_PCT:.0}% threshold"
        ));
    }

    let metrics = vec![
        QualityMetric::new("response_time", response_time_score, RESPONSE_TIME_THRESHOLD_S, 0.3, response_time_score >= 1.0, "response time within threshold"),
        QualityMetric::new("throughput", throughput_score, THROUGHPUT_THRESHOLD_PER_MIN, 0.2, throughput_score >= 1.0, "throughput meets the minimum"),
        QualityMetric::new("error_rate", error_rate_score, ERROR_RATE_THRESHOLD, 0.3, error_rate_score >= 1.0, "error rate within threshold"),
        QualityMetric::new("resource_usage", resource_score, RESOURCE_USAGE_THRESHOLD_PCT, 0.2, resource_score >= 1.0, "CPU/memory usage within threshold"),
    ];

    let overall_score = metrics.iter().map(|m| m.value * m.weight).sum();
    let passed = metrics.iter().all(|m| m.passed);
    let recommendations = if passed {
        Vec::new()
    } else {
        vec!["investigate the workflow's slowest stage and error sources before the next run".to_string()]
    };

    QualityCheckResult::new(
        QualityCheckType::PerformanceMonitoring,
        workflow_id.to_string(),
        overall_score,
        metrics,
        issues,
        recommendations,
        passed,
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_sample_passes() {
        let sample = PerformanceSample { response_time_s: 5.0, throughput_per_min: 20.0, error_rate: 0.01, cpu_percent: 40.0, mem_percent: 50.0 };
        let result = check("w1", &sample, Utc::now());
        assert!(result.passed);
        assert_eq!(result.overall_score, 1.0);
    }

    #[test]
    fn slow_response_time_decays_but_does_not_cliff() {
        let sample = PerformanceSample { response_time_s: 45.0, throughput_per_min: 20.0, error_rate: 0.0, cpu_percent: 10.0, mem_percent: 10.0 };
        let result = check("w2", &sample, Utc::now());
        assert!(!result.passed);
        assert!(result.overall_score > 0.0);
        assert!(result.issues.iter().any(|i| i.contains("response time")));
    }

    #[test]
    fn catastrophic_sample_bottoms_out_at_zero() {
        let sample = PerformanceSample { response_time_s: 600.0, throughput_per_min: 0.0, error_rate: 1.0, cpu_percent: 100.0, mem_percent: 100.0 };
        let result = check("w3", &sample, Utc::now());
        assert!(result.overall_score < 0.1);
    }
}
