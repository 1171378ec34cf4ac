//! Request/response shapes for the report pipeline (spec §4.11, §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    Basic,
    Standard,
    Deep,
}

impl Default for AnalysisDepth {
    fn default() -> Self {
        AnalysisDepth::Standard
    }
}

/// The core's internal request shape (spec §6: "a structured request
/// carrying `content` ... not a wire format"). Parsing free-form input
/// into this type is the driver's job (spec §9 "Dynamic input shapes");
/// the report pipeline only ever sees the typed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub report_id: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub time_range: Option<(i32, i32)>,
    pub focus_areas: Vec<String>,
    pub depth: AnalysisDepth,
}

/// A chart specification (spec §4.11 "Chart specs"); the concrete pixels
/// are produced by the external `ChartRenderer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_id: String,
    pub chart_type: ChartType,
    pub title: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub series_labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Line,
    Pie,
    Bar,
}

/// Composed report content before rendering (spec §4.11 "build content").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContent {
    pub summary: String,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Html,
    Pdf,
    Json,
    Zip,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
            ExportFormat::Zip => "zip",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
            ExportFormat::Zip => "zip",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "html" => Some(ExportFormat::Html),
            "pdf" => Some(ExportFormat::Pdf),
            "json" => Some(ExportFormat::Json),
            "zip" => Some(ExportFormat::Zip),
            _ => None,
        }
    }
}

/// A single exported artifact's on-disk record (spec §3 `ReportVersion.files`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedFile {
    pub path: String,
    pub size: u64,
    pub hash: String,
    /// Set to `"pdf_error"` when the PDF export fell back to an HTML +
    /// explainer pair (spec §4.11 export behavior).
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Creating,
    Completed,
    Failed,
}

/// One version of one report (spec §3 `ReportVersion`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportVersion {
    pub report_id: String,
    pub version_number: u32,
    pub created_at: DateTime<Utc>,
    pub status: VersionStatus,
    pub files: HashMap<String, ExportedFile>,
    pub parameters: Value,
}
