//! Report composition, chart specs, template rendering, and
//! multi-format export pipeline (spec §4.11).

pub mod charts;
pub mod content;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod storage;
pub mod types;
pub mod versioning;

pub use metrics::ReportPipelineMetrics;
pub use pipeline::{ReportCollaborators, ReportPipeline, ReportPipelineConfig};
pub use types::{
    AnalysisDepth, ChartSpec, ChartType, ExportFormat, ExportedFile, ReportContent, ReportRequest,
    ReportSection, ReportVersion, VersionStatus,
};
