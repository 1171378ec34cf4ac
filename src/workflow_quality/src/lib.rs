//! Workflow quality control (spec §4.10): input validation against
//! per-type schemas, cross-result batch consistency, performance
//! monitoring, alerting, and per-workflow history/trend reports.

pub mod alerting;
pub mod consistency;
pub mod controller;
pub mod history;
pub mod metrics;
pub mod performance;
pub mod types;
pub mod validation;

pub use controller::{WorkflowQualityController, WorkflowQualityControllerConfig};
pub use metrics::WorkflowQualityControllerMetrics;
pub use types::{
    AlertKind, AlertSeverity, QualityAlert, QualityCheckResult, QualityCheckType, QualityMetric,
    QualityTrend, WorkflowQualityReport,
};
