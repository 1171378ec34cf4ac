//! Shared value types for the workflow quality controller (spec §4.10):
//! one `QualityCheckResult` shape reused by input validation, batch
//! consistency, and performance checks, plus the alert and history
//! records layered on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCheckType {
    DataValidation,
    ResultConsistency,
    PerformanceMonitoring,
}

impl QualityCheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityCheckType::DataValidation => "data_validation",
            QualityCheckType::ResultConsistency => "result_consistency",
            QualityCheckType::PerformanceMonitoring => "performance_monitoring",
        }
    }
}

/// One scored sub-check (e.g. "required_fields" inside a validation
/// check, or "response_time" inside a performance check).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetric {
    pub metric_name: String,
    pub value: f64,
    pub threshold: f64,
    pub weight: f64,
    pub passed: bool,
    pub description: String,
}

impl QualityMetric {
    pub fn new(
        metric_name: impl Into<String>,
        value: f64,
        threshold: f64,
        weight: f64,
        passed: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            threshold,
            weight,
            passed,
            description: description.into(),
        }
    }
}

/// Result of a single quality check (spec §4.10), reused verbatim by
/// the three check kinds above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityCheckResult {
    pub check_type: QualityCheckType,
    pub target_id: String,
    pub overall_score: f64,
    pub metrics: Vec<QualityMetric>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
}

impl QualityCheckResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        check_type: QualityCheckType,
        target_id: String,
        overall_score: f64,
        metrics: Vec<QualityMetric>,
        issues: Vec<String>,
        recommendations: Vec<String>,
        passed: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            check_type,
            target_id,
            overall_score,
            metrics,
            issues,
            recommendations,
            passed,
            timestamp,
        }
    }

    /// A zero-score, outright failure (unknown schema, empty batch, ...).
    pub fn failed(
        check_type: QualityCheckType,
        target_id: String,
        issues: Vec<String>,
        recommendations: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            check_type,
            target_id,
            overall_score: 0.0,
            metrics: Vec::new(),
            issues,
            recommendations,
            passed: false,
            timestamp,
        }
    }
}

/// An alert fired by the controller (spec §4.10 "Alerts").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    QualityDegradation,
    ConsecutiveFailures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAlert {
    pub kind: AlertKind,
    pub workflow_id: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// A workflow's trend over its last checks (spec §4.10 "Reports").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTrend {
    Improving,
    Declining,
    Stable,
}

/// Per-workflow summary report (spec §4.10 "Reports").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowQualityReport {
    pub workflow_id: String,
    pub average_score: f64,
    pub per_type_average: std::collections::HashMap<String, f64>,
    pub trend: QualityTrend,
    pub check_count: usize,
    pub failed_count: usize,
}
