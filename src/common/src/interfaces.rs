//! External collaborator interfaces (spec §6). The core depends only on
//! these traits; concrete implementations (chromium-driven scraping, LLM
//! clients, chart/template/PDF backends) live outside this repository.

use crate::error::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Injectable wall clock so components (and tests) never call
/// `Utc::now()` directly (spec §6).
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// One raw search hit before quality scoring (spec §4.5 step 5 adds the
/// `*_score` fields; this is the collaborator-facing shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchRecord {
    pub title: String,
    pub url: String,
    pub content: String,
    pub source: String,
    pub published_year: Option<i32>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    General,
    Patent,
    Academic,
    News,
}

/// A third-party search backend (spec §6: `SearchSource`).
#[async_trait]
pub trait SearchSource: Send + Sync {
    fn name(&self) -> &str;
    async fn search(
        &self,
        keywords: &[String],
        kind: SearchKind,
        limit: usize,
    ) -> CoreResult<Vec<RawSearchRecord>>;
    async fn health(&self) -> bool;
    async fn close(&self);
}

/// A text-generation backend (spec §6: `TextGenerator`).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> CoreResult<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedChart {
    pub path: String,
    pub size: u64,
    pub format: String,
}

/// A chart-rendering backend (spec §6: `ChartRenderer`).
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, spec: &Value) -> CoreResult<RenderedChart>;
}

/// A template-rendering backend (spec §6: `TemplateRenderer`).
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    async fn render(&self, template_name: &str, data: &Value) -> CoreResult<String>;
}

/// A document-export backend (spec §6: `DocumentExporter`).
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    async fn html_to_pdf(&self, html: &str, options: &Value) -> CoreResult<Vec<u8>>;
}

/// Metrics/alert sink (spec §6: `MonitoringSink`).
#[async_trait]
pub trait MonitoringSink: Send + Sync {
    async fn record_metrics(&self, namespace: &str, fields: HashMap<String, f64>);
    async fn send_alert(&self, alert: Value);
}
