//! Cross-result consistency over a batch of task outputs (spec §4.10):
//! numerical fields must have coefficient-of-variation ≤ 0.2,
//! categorical fields need a most-frequent share ≥ 0.6, and a
//! `direction` field (trend results) needs ≥ 0.6 agreement.

use crate::types::{QualityCheckResult, QualityCheckType, QualityMetric};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

const NUMERIC_CV_THRESHOLD: f64 = 0.2;
const CATEGORICAL_SHARE_THRESHOLD: f64 = 0.6;
const DIRECTION_AGREEMENT_THRESHOLD: f64 = 0.6;

fn numeric_fields(batch: &[Value]) -> HashMap<String, Vec<f64>> {
    let mut fields: HashMap<String, Vec<f64>> = HashMap::new();
    for item in batch {
        let Some(map) = item.as_object() else { continue };
        for (key, value) in map {
            if let Some(n) = value.as_f64() {
                fields.entry(key.clone()).or_default().push(n);
            }
        }
    }
    fields.retain(|_, values| values.len() == batch.len());
    fields
}

fn categorical_fields(batch: &[Value]) -> HashMap<String, Vec<String>> {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    for item in batch {
        let Some(map) = item.as_object() else { continue };
        for (key, value) in map {
            if let Some(s) = value.as_str() {
                fields.entry(key.clone()).or_default().push(s.to_string());
            }
        }
    }
    fields.retain(|_, values| values.len() == batch.len());
    fields
}

fn coefficient_of_variation(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    if mean.abs() < 1e-9 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean.abs()
}

fn most_frequent_share(values: &[String]) -> f64 {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }
    let max_count = counts.values().copied().max().unwrap_or(0);
    max_count as f64 / values.len() as f64
}

/// Checks a batch of loosely-typed result payloads for numerical,
/// categorical, and trend-direction consistency.
pub fn check(batch_id: &str, batch: &[Value], now: DateTime<Utc>) -> QualityCheckResult {
    if batch.is_empty() {
        return QualityCheckResult::failed(
            QualityCheckType::ResultConsistency,
            batch_id.to_string(),
            vec!["batch is empty".to_string()],
            vec!["provide at least one result to check consistency".to_string()],
            now,
        );
    }
    if batch.len() == 1 {
        let metric = QualityMetric::new("single_item", 1.0, 1.0, 1.0, true, "a single-item batch is trivially consistent");
        return QualityCheckResult::new(
            QualityCheckType::ResultConsistency,
            batch_id.to_string(),
            1.0,
            vec![metric],
            Vec::new(),
            Vec::new(),
            true,
            now,
        );
    }

    let mut issues = Vec::new();
    let mut metrics = Vec::new();

    let numeric = numeric_fields(batch);
    if numeric.is_empty() {
        metrics.push(QualityMetric::new("numerical_consistency", 1.0, 1.0, 0.4, true, "no shared numeric fields to compare"));
    } else {
        let mut field_scores = Vec::new();
        for (field, values) in &numeric {
            let cv = coefficient_of_variation(values);
            let ok = cv <= NUMERIC_CV_THRESHOLD;
            field_scores.push(if ok { 1.0 } else { (NUMERIC_CV_THRESHOLD / cv.max(1e-9)).min(1.0) });
            if !ok {
                issues.push(format!("field '{field}' has high variance across the batch (cv={cv:.2})"));
            }
        }
        let score = field_scores.iter().sum::<f64>() / field_scores.len() as f64;
        metrics.push(QualityMetric::new("numerical_consistency", score, 1.0, 0.4, score >= 0.8, "numeric fields agree within tolerance"));
    }

    let categorical = categorical_fields(batch);
    let direction_values = categorical.get("direction").cloned();
    let non_direction: HashMap<&String, &Vec<String>> =
        categorical.iter().filter(|(k, _)| k.as_str() != "direction").collect();
    if non_direction.is_empty() {
        metrics.push(QualityMetric::new("categorical_consistency", 1.0, 1.0, 0.3, true, "no shared categorical fields to compare"));
    } else {
        let mut field_scores = Vec::new();
        for (field, values) in &non_direction {
            let share = most_frequent_share(values);
            let ok = share >= CATEGORICAL_SHARE_THRESHOLD;
            field_scores.push(share);
            if !ok {
                issues.push(format!("field '{field}' disagrees across the batch (majority share={share:.2})"));
            }
        }
        let score = field_scores.iter().sum::<f64>() / field_scores.len() as f64;
        metrics.push(QualityMetric::new("categorical_consistency", score, CATEGORICAL_SHARE_THRESHOLD, 0.3, score >= CATEGORICAL_SHARE_THRESHOLD, "categorical fields largely agree"));
    }

    if let Some(directions) = direction_values {
        let share = most_frequent_share(&directions);
        let ok = share >= DIRECTION_AGREEMENT_THRESHOLD;
        if !ok {
            issues.push(format!("trend direction disagrees across the batch (agreement={share:.2})"));
        }
        metrics.push(QualityMetric::new("trend_direction_agreement", share, DIRECTION_AGREEMENT_THRESHOLD, 0.3, ok, "trend direction agrees across the batch"));
    }

    let total_weight: f64 = metrics.iter().map(|m| m.weight).sum();
    let overall_score = if total_weight > 0.0 {
        metrics.iter().map(|m| m.value * m.weight).sum::<f64>() / total_weight
    } else {
        1.0
    };
    let passed = metrics.iter().all(|m| m.passed);
    let recommendations = if issues.is_empty() {
        Vec::new()
    } else {
        vec!["investigate why results diverge across the batch before aggregating them".to_string()]
    };

    QualityCheckResult::new(QualityCheckType::ResultConsistency, batch_id.to_string(), overall_score, metrics, issues, recommendations, passed, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_results_are_fully_consistent() {
        let batch = vec![json!({"count": 10.0, "direction": "increasing"}); 5];
        let result = check("b1", &batch, Utc::now());
        assert!(result.passed);
        assert_eq!(result.overall_score, 1.0);
    }

    #[test]
    fn high_variance_numeric_field_is_flagged() {
        let batch = vec![json!({"count": 1.0}), json!({"count": 100.0}), json!({"count": 5.0})];
        let result = check("b2", &batch, Utc::now());
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i.contains("count")));
    }

    #[test]
    fn disagreeing_direction_is_flagged() {
        let batch = vec![
            json!({"direction": "increasing"}),
            json!({"direction": "decreasing"}),
            json!({"direction": "increasing"}),
            json!({"direction": "decreasing"}),
        ];
        let result = check("b3", &batch, Utc::now());
        assert!(result.issues.iter().any(|i| i.contains("trend direction")));
    }

    #[test]
    fn empty_batch_fails_outright() {
        let result = check("b4", &[], Utc::now());
        assert!(!result.passed);
    }
}
