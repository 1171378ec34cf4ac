//! Per-workflow quality-check history and the summary report built from
//! it (spec §4.10 "Reports"): averages, per-type averages, and a trend
//! over the last five checks.

use crate::types::{QualityCheckResult, QualityTrend, WorkflowQualityReport};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;

const HISTORY_CAPACITY: usize = 100;
const TREND_WINDOW: usize = 5;
const TREND_THRESHOLD: f64 = 0.05;

pub struct HistoryStore {
    per_workflow: DashMap<String, Mutex<Vec<QualityCheckResult>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self { per_workflow: DashMap::new() }
    }

    pub fn record(&self, workflow_id: &str, result: QualityCheckResult) {
        let entry = self.per_workflow.entry(workflow_id.to_string()).or_insert_with(|| Mutex::new(Vec::new()));
        let mut history = entry.lock();
        history.push(result);
        if history.len() > HISTORY_CAPACITY {
            history.remove(0);
        }
    }

    pub fn recent(&self, workflow_id: &str) -> Vec<QualityCheckResult> {
        self.per_workflow.get(workflow_id).map(|h| h.lock().clone()).unwrap_or_default()
    }

    pub fn report(&self, workflow_id: &str) -> Option<WorkflowQualityReport> {
        let history = self.recent(workflow_id);
        if history.is_empty() {
            return None;
        }

        let average_score = history.iter().map(|c| c.overall_score).sum::<f64>() / history.len() as f64;

        let mut per_type_scores: HashMap<String, Vec<f64>> = HashMap::new();
        for check in &history {
            per_type_scores.entry(check.check_type.as_str().to_string()).or_default().push(check.overall_score);
        }
        let per_type_average = per_type_scores
            .into_iter()
            .map(|(k, v)| (k, v.iter().sum::<f64>() / v.len() as f64))
            .collect();

        let failed_count = history.iter().filter(|c| !c.passed).count();
        let trend = trend_over_recent(&history);

        Some(WorkflowQualityReport {
            workflow_id: workflow_id.to_string(),
            average_score,
            per_type_average,
            trend,
            check_count: history.len(),
            failed_count,
        })
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares the mean of the first half to the second half of the last
/// `TREND_WINDOW` checks; a move beyond `±TREND_THRESHOLD` is a trend,
/// otherwise `stable`.
fn trend_over_recent(history: &[QualityCheckResult]) -> QualityTrend {
    let window = &history[history.len().saturating_sub(TREND_WINDOW)..];
    if window.len() < 2 {
        return QualityTrend::Stable;
    }
    let mid = window.len() / 2;
    let (first_half, second_half) = window.split_at(mid);
    let first_avg = first_half.iter().map(|c| c.overall_score).sum::<f64>() / first_half.len() as f64;
    let second_avg = second_half.iter().map(|c| c.overall_score).sum::<f64>() / second_half.len() as f64;
    let delta = second_avg - first_avg;
    if delta > TREND_THRESHOLD {
        QualityTrend::Improving
    } else if delta < -TREND_THRESHOLD {
        QualityTrend::Declining
    } else {
        QualityTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QualityCheckType, QualityMetric};
    use chrono::Utc;

    fn result(score: f64) -> QualityCheckResult {
        QualityCheckResult::new(
            QualityCheckType::DataValidation,
            "t".to_string(),
            score,
            vec![QualityMetric::new("m", score, 1.0, 1.0, score >= 0.6, "d")],
            Vec::new(),
            Vec::new(),
            score >= 0.6,
            Utc::now(),
        )
    }

    #[test]
    fn no_history_yields_no_report() {
        let store = HistoryStore::new();
        assert!(store.report("w1").is_none());
    }

    #[test]
    fn improving_scores_are_detected() {
        let store = HistoryStore::new();
        for score in [0.3, 0.3, 0.9, 0.9, 0.95] {
            store.record("w1", result(score));
        }
        let report = store.report("w1").unwrap();
        assert_eq!(report.trend, QualityTrend::Improving);
        assert_eq!(report.check_count, 5);
    }

    #[test]
    fn history_is_bounded() {
        let store = HistoryStore::new();
        for _ in 0..150 {
            store.record("w1", result(0.9));
        }
        assert_eq!(store.recent("w1").len(), HISTORY_CAPACITY);
    }
}
