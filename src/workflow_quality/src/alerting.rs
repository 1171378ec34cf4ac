//! Alert generation and the bounded alert log (spec §4.10 "Alerts"):
//! `quality_degradation` when a check scores below the pass threshold,
//! `consecutive_failures` when a workflow's last three checks all
//! failed. Alerts are forwarded to a `MonitoringSink` when one is
//! configured.

use crate::types::{AlertKind, AlertSeverity, QualityAlert, QualityCheckResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;

const ALERT_HISTORY_CAPACITY: usize = 1000;
const CONSECUTIVE_FAILURE_WINDOW: usize = 3;

pub struct AlertLog {
    alerts: Mutex<VecDeque<QualityAlert>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self { alerts: Mutex::new(VecDeque::new()) }
    }

    pub fn push(&self, alert: QualityAlert) {
        let mut alerts = self.alerts.lock();
        alerts.push_back(alert);
        if alerts.len() > ALERT_HISTORY_CAPACITY {
            alerts.pop_front();
        }
    }

    pub fn all(&self) -> Vec<QualityAlert> {
        self.alerts.lock().iter().cloned().collect()
    }

    pub fn for_workflow(&self, workflow_id: &str) -> Vec<QualityAlert> {
        self.alerts.lock().iter().filter(|a| a.workflow_id == workflow_id).cloned().collect()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates one freshly-recorded check against the pass threshold and
/// the workflow's recent history, returning any alerts that should fire.
pub fn evaluate(
    workflow_id: &str,
    latest: &QualityCheckResult,
    recent_history: &[QualityCheckResult],
    pass_threshold: f64,
    now: DateTime<Utc>,
) -> Vec<QualityAlert> {
    let mut alerts = Vec::new();

    if latest.overall_score < pass_threshold {
        alerts.push(QualityAlert {
            kind: AlertKind::QualityDegradation,
            workflow_id: workflow_id.to_string(),
            message: format!(
                "{} check for '{}' scored {:.2}, below the {:.2} pass threshold",
                latest.check_type.as_str(),
                latest.target_id,
                latest.overall_score,
                pass_threshold
            ),
            severity: if latest.overall_score < pass_threshold * 0.5 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            },
            timestamp: now,
        });
    }

    if recent_history.len() >= CONSECUTIVE_FAILURE_WINDOW {
        let last_n = &recent_history[recent_history.len() - CONSECUTIVE_FAILURE_WINDOW..];
        if last_n.iter().all(|c| !c.passed) {
            alerts.push(QualityAlert {
                kind: AlertKind::ConsecutiveFailures,
                workflow_id: workflow_id.to_string(),
                message: format!(
                    "workflow '{workflow_id}' has failed its last {CONSECUTIVE_FAILURE_WINDOW} quality checks in a row"
                ),
                severity: AlertSeverity::Critical,
                timestamp: now,
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QualityCheckType, QualityMetric};

    fn result(score: f64, passed: bool) -> QualityCheckResult {
        QualityCheckResult::new(
            QualityCheckType::PerformanceMonitoring,
            "w1".to_string(),
            score,
            vec![QualityMetric::new("m", score, 1.0, 1.0, passed, "d")],
            Vec::new(),
            Vec::new(),
            passed,
            Utc::now(),
        )
    }

    #[test]
    fn low_score_fires_quality_degradation() {
        let latest = result(0.4, false);
        let alerts = evaluate("w1", &latest, &[], 0.6, Utc::now());
        assert!(alerts.iter().any(|a| a.kind == AlertKind::QualityDegradation));
    }

    #[test]
    fn three_consecutive_failures_fire_consecutive_failures() {
        let history = vec![result(0.2, false), result(0.3, false), result(0.1, false)];
        let latest = result(0.1, false);
        let alerts = evaluate("w1", &latest, &history, 0.6, Utc::now());
        assert!(alerts.iter().any(|a| a.kind == AlertKind::ConsecutiveFailures));
    }

    #[test]
    fn passing_score_fires_nothing() {
        let latest = result(0.95, true);
        let alerts = evaluate("w1", &latest, &[], 0.6, Utc::now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn alert_log_is_bounded_and_filterable() {
        let log = AlertLog::new();
        for i in 0..5 {
            log.push(QualityAlert {
                kind: AlertKind::QualityDegradation,
                workflow_id: format!("w{}", i % 2),
                message: "x".to_string(),
                severity: AlertSeverity::Warning,
                timestamp: Utc::now(),
            });
        }
        assert_eq!(log.all().len(), 5);
        assert_eq!(log.for_workflow("w0").len(), 3);
    }
}
