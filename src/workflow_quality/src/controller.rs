//! Wires input validation, batch consistency, and performance
//! monitoring into one controller with alerting, history, and
//! per-workflow reports (spec §4.10).

use crate::alerting::{self, AlertLog};
use crate::history::HistoryStore;
use crate::metrics::WorkflowQualityControllerMetrics;
use crate::performance::{self, PerformanceSample};
use crate::types::{QualityAlert, QualityCheckResult, WorkflowQualityReport};
use crate::{consistency, validation};
use chrono::{DateTime, Utc};
use patentflow_common::{Clock, MonitoringSink};
use serde_json::Value;
use std::sync::Arc;

/// Resolves spec.md §9's Open Question on the pass-threshold literal:
/// C10's default (0.6) differs from C9's (0.7), so both are exposed as
/// configuration rather than hardcoded.
pub struct WorkflowQualityControllerConfig {
    pub configurable_pass_threshold: f64,
}

impl Default for WorkflowQualityControllerConfig {
    fn default() -> Self {
        Self { configurable_pass_threshold: 0.6 }
    }
}

pub struct WorkflowQualityController {
    config: WorkflowQualityControllerConfig,
    history: HistoryStore,
    alerts: AlertLog,
    metrics: WorkflowQualityControllerMetrics,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn MonitoringSink>>,
}

impl WorkflowQualityController {
    pub fn new(config: WorkflowQualityControllerConfig, clock: Arc<dyn Clock>, sink: Option<Arc<dyn MonitoringSink>>) -> Self {
        Self {
            config,
            history: HistoryStore::new(),
            alerts: AlertLog::new(),
            metrics: WorkflowQualityControllerMetrics::new(),
            clock,
            sink,
        }
    }

    pub fn metrics(&self) -> &WorkflowQualityControllerMetrics {
        &self.metrics
    }

    pub fn alerts_for(&self, workflow_id: &str) -> Vec<QualityAlert> {
        self.alerts.for_workflow(workflow_id)
    }

    pub fn all_alerts(&self) -> Vec<QualityAlert> {
        self.alerts.all()
    }

    pub fn report(&self, workflow_id: &str) -> Option<WorkflowQualityReport> {
        self.history.report(workflow_id)
    }

    /// Validates a payload against its schema (spec §4.10 "Input
    /// validation"), recording the check against `workflow_id`'s history.
    pub async fn validate_input(&self, workflow_id: &str, data_type: &str, data: &Value, target_id: &str) -> QualityCheckResult {
        let now = self.clock.now();
        let result = validation::validate(data_type, data, target_id, now);
        self.record(workflow_id, result, now).await
    }

    /// Validates a payload whose type is inferred from its shape.
    pub async fn validate_input_auto(&self, workflow_id: &str, data: &Value, target_id: &str) -> QualityCheckResult {
        let data_type = validation::determine_data_type(data);
        self.validate_input(workflow_id, data_type, data, target_id).await
    }

    /// Checks a batch of task results for cross-result consistency
    /// (spec §4.10 "Result consistency").
    pub async fn check_consistency(&self, workflow_id: &str, batch: &[Value]) -> QualityCheckResult {
        let now = self.clock.now();
        let result = consistency::check(workflow_id, batch, now);
        self.record(workflow_id, result, now).await
    }

    /// Checks one workflow run's performance sample (spec §4.10
    /// "Performance check").
    pub async fn check_performance(&self, workflow_id: &str, sample: &PerformanceSample) -> QualityCheckResult {
        let now = self.clock.now();
        let result = performance::check(workflow_id, sample, now);
        self.record(workflow_id, result, now).await
    }

    async fn record(&self, workflow_id: &str, result: QualityCheckResult, now: DateTime<Utc>) -> QualityCheckResult {
        let started = std::time::Instant::now();
        let recent = self.history.recent(workflow_id);
        let fired = alerting::evaluate(workflow_id, &result, &recent, self.config.configurable_pass_threshold, now);

        self.history.record(workflow_id, result.clone());
        for alert in &fired {
            self.alerts.push(alert.clone());
            if let Some(sink) = &self.sink {
                sink.send_alert(serde_json::to_value(alert).unwrap_or(Value::Null)).await;
            }
        }
        if let Some(sink) = &self.sink {
            let mut fields = std::collections::HashMap::new();
            fields.insert("overall_score".to_string(), result.overall_score);
            fields.insert("passed".to_string(), if result.passed { 1.0 } else { 0.0 });
            sink.record_metrics(&format!("workflow_quality.{workflow_id}"), fields).await;
        }

        self.metrics.record(result.passed, fired.len(), started.elapsed().as_secs_f64());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use patentflow_common::fakes::{FixedClock, RecordingMonitoringSink};
    use serde_json::json;

    fn controller() -> (WorkflowQualityController, RecordingMonitoringSink) {
        let sink = RecordingMonitoringSink::default();
        let controller = WorkflowQualityController::new(
            WorkflowQualityControllerConfig::default(),
            Arc::new(FixedClock::new(Utc::now())),
            Some(Arc::new(sink.clone())),
        );
        (controller, sink)
    }

    #[tokio::test]
    async fn validate_input_routes_through_schema_and_records_history() {
        let (controller, _sink) = controller();
        let data = json!({
            "title": "A novel widget assembly",
            "application_number": "US12345678",
            "applicants": ["Acme Corp"],
        });
        let result = controller.validate_input("wf1", "patent_data", &data, "p1").await;
        assert!(result.passed);
        assert_eq!(controller.report("wf1").unwrap().check_count, 1);
    }

    #[tokio::test]
    async fn low_quality_check_fires_alert_and_forwards_to_sink() {
        let (controller, sink) = controller();
        let data = json!({});
        controller.validate_input("wf2", "patent_data", &data, "p2").await;
        assert!(!controller.alerts_for("wf2").is_empty());
        assert!(!sink.alerts().is_empty());
    }

    #[tokio::test]
    async fn three_failing_checks_fire_consecutive_failures_alert() {
        let (controller, _sink) = controller();
        for _ in 0..3 {
            controller.validate_input("wf3", "patent_data", &json!({}), "p").await;
        }
        let alerts = controller.alerts_for("wf3");
        assert!(alerts.iter().any(|a| matches!(a.kind, crate::types::AlertKind::ConsecutiveFailures)));
    }
}
