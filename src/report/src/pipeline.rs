//! End-to-end report generation (spec §4.11): parse request → build
//! content → build chart specs → render → export per format, with
//! version creation and a persisted storage/versions index.

use crate::export;
use crate::storage::{ReportStorage, StorageIndex, VersionIndexRecord, VersionsIndexEntry};
use crate::types::{ExportFormat, ExportedFile, ReportRequest, ReportVersion, VersionStatus};
use crate::versioning::{VersionManager, DEFAULT_MAX_VERSIONS};
use crate::{charts, content, metrics::ReportPipelineMetrics, render};
use patentflow_common::{AnalysisBundle, ChartRenderer, Clock, CoreError, CoreResult, DocumentExporter, TemplateRenderer, TextGenerator};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ReportPipelineConfig {
    pub max_versions: usize,
}

impl Default for ReportPipelineConfig {
    fn default() -> Self {
        Self { max_versions: DEFAULT_MAX_VERSIONS }
    }
}

/// The external collaborators the pipeline renders and exports through
/// (spec §6); bundled so callers don't thread five trait objects
/// through every call.
pub struct ReportCollaborators<'a> {
    pub text_generator: Option<&'a dyn TextGenerator>,
    pub template_renderer: &'a dyn TemplateRenderer,
    pub chart_renderer: &'a dyn ChartRenderer,
    pub document_exporter: &'a dyn DocumentExporter,
}

pub struct ReportPipeline {
    storage: Arc<ReportStorage>,
    versions: VersionManager,
    metrics: ReportPipelineMetrics,
    clock: Arc<dyn Clock>,
}

impl ReportPipeline {
    pub fn new(output_dir: impl Into<std::path::PathBuf>, config: ReportPipelineConfig, clock: Arc<dyn Clock>) -> Self {
        let storage = Arc::new(ReportStorage::new(output_dir));
        let versions = VersionManager::new(storage.clone(), config.max_versions);
        Self { storage, versions, metrics: ReportPipelineMetrics::new(), clock }
    }

    pub fn metrics(&self) -> &ReportPipelineMetrics {
        &self.metrics
    }

    pub fn storage(&self) -> &ReportStorage {
        &self.storage
    }

    pub fn version_history(&self, report_id: &str) -> Vec<ReportVersion> {
        self.versions.history(report_id)
    }

    /// Runs the full pipeline for `request` against `bundle`, producing
    /// one new `ReportVersion` that carries every requested format's
    /// files.
    pub async fn generate(
        &self,
        request: &ReportRequest,
        bundle: &AnalysisBundle,
        formats: &[ExportFormat],
        collaborators: &ReportCollaborators<'_>,
    ) -> CoreResult<ReportVersion> {
        let started = std::time::Instant::now();
        self.storage.ensure_layout().await.map_err(io_error)?;

        let result = self.generate_inner(request, bundle, formats, collaborators).await;
        match &result {
            Ok(_) => {
                let format_names: Vec<&str> = formats.iter().map(|f| f.as_str()).collect();
                self.metrics.record_success(&format_names, started.elapsed().as_secs_f64());
            }
            Err(_) => self.metrics.record_failure(),
        }
        let _ = self.storage.clean_temp().await;
        result
    }

    async fn generate_inner(
        &self,
        request: &ReportRequest,
        bundle: &AnalysisBundle,
        formats: &[ExportFormat],
        collaborators: &ReportCollaborators<'_>,
    ) -> CoreResult<ReportVersion> {
        let built_content = content::build(request, bundle, collaborators.text_generator).await;
        let chart_specs = charts::build(bundle);
        let rendered = render::render(&built_content, &chart_specs, collaborators.template_renderer, collaborators.chart_renderer).await?;

        let version_number = self.versions.next_version_number(&request.report_id);
        let now = self.clock.now();

        let mut files: HashMap<String, ExportedFile> = HashMap::new();
        for format in formats {
            let produced = export::export_one(
                *format,
                &request.report_id,
                version_number,
                &rendered.html,
                &built_content,
                &chart_specs,
                &self.storage,
                collaborators.document_exporter,
            )
            .await?;
            files.extend(produced);
        }

        let version = ReportVersion {
            report_id: request.report_id.clone(),
            version_number,
            created_at: now,
            status: VersionStatus::Completed,
            files,
            parameters: serde_json::to_value(request).unwrap_or(serde_json::Value::Null),
        };

        self.versions.record(version.clone()).await;
        self.persist_indexes(&request.report_id, now).await.map_err(io_error)?;

        Ok(version)
    }

    /// Deletes a report's entire version history, including its files,
    /// and drops it from both persisted indexes.
    pub async fn delete_report(&self, report_id: &str) -> CoreResult<()> {
        self.versions.delete_report(report_id).await;
        let mut versions_index = self.storage.load_versions_index().await;
        versions_index.reports.remove(report_id);
        self.storage.save_versions_index(&versions_index).await.map_err(io_error)?;
        let mut storage_index = self.storage.load_storage_index().await;
        storage_index.reports.remove(report_id);
        self.storage.save_storage_index(&storage_index).await.map_err(io_error)?;
        Ok(())
    }

    async fn persist_indexes(&self, report_id: &str, now: chrono::DateTime<chrono::Utc>) -> std::io::Result<()> {
        let history = self.versions.history(report_id);

        let mut storage_index = self.storage.load_storage_index().await;
        let all_files: Vec<ExportedFile> = history.iter().flat_map(|v| v.files.values().cloned()).collect();
        storage_index.reports.insert(report_id.to_string(), all_files);
        self.storage.save_storage_index(&storage_index).await?;

        let mut versions_index = self.storage.load_versions_index().await;
        let created_at = versions_index.reports.get(report_id).map(|e| e.created_at).unwrap_or(now);
        let latest_version = history.iter().map(|v| v.version_number).max().unwrap_or(0);
        let records = history
            .iter()
            .map(|v| VersionIndexRecord {
                version_id: format!("{report_id}_v{}", v.version_number),
                version_number: v.version_number,
                created_at: v.created_at,
                updated_at: v.created_at,
                status: v.status,
                files: v.files.clone(),
                parameters: v.parameters.clone(),
            })
            .collect();
        versions_index.reports.insert(report_id.to_string(), VersionsIndexEntry { created_at, latest_version, versions: records });
        self.storage.save_versions_index(&versions_index).await
    }
}

fn io_error(err: std::io::Error) -> CoreError {
    CoreError::internal(format!("report pipeline I/O failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisDepth;
    use chrono::Utc;
    use patentflow_common::fakes::{FixedClock, NullChartRenderer, StringTemplateRenderer, UnsupportedDocumentExporter};
    use patentflow_common::TrendResult;

    fn request() -> ReportRequest {
        ReportRequest {
            report_id: "r1".to_string(),
            content: "battery patents".to_string(),
            keywords: vec!["battery".to_string()],
            time_range: None,
            focus_areas: Vec::new(),
            depth: AnalysisDepth::Standard,
        }
    }

    fn collaborators<'a>(exporter: &'a UnsupportedDocumentExporter, template: &'a StringTemplateRenderer, chart: &'a NullChartRenderer) -> ReportCollaborators<'a> {
        ReportCollaborators { text_generator: None, template_renderer: template, chart_renderer: chart, document_exporter: exporter }
    }

    #[tokio::test]
    async fn generates_html_and_json_and_persists_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ReportPipeline::new(dir.path(), ReportPipelineConfig::default(), Arc::new(FixedClock::new(Utc::now())));
        let bundle = AnalysisBundle { trend: Some(TrendResult::default()), ..Default::default() };
        let exporter = UnsupportedDocumentExporter;
        let template = StringTemplateRenderer;
        let chart = NullChartRenderer;
        let version = pipeline
            .generate(&request(), &bundle, &[ExportFormat::Html, ExportFormat::Json], &collaborators(&exporter, &template, &chart))
            .await
            .unwrap();
        assert_eq!(version.version_number, 1);
        assert!(version.files.contains_key("html"));
        assert!(version.files.contains_key("json"));

        let index = pipeline.storage().load_versions_index().await;
        assert_eq!(index.reports.get("r1").unwrap().latest_version, 1);
    }

    #[tokio::test]
    async fn successive_generations_increase_version_number() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ReportPipeline::new(dir.path(), ReportPipelineConfig::default(), Arc::new(FixedClock::new(Utc::now())));
        let bundle = AnalysisBundle::default();
        let exporter = UnsupportedDocumentExporter;
        let template = StringTemplateRenderer;
        let chart = NullChartRenderer;
        let collab = collaborators(&exporter, &template, &chart);
        let v1 = pipeline.generate(&request(), &bundle, &[ExportFormat::Html], &collab).await.unwrap();
        let v2 = pipeline.generate(&request(), &bundle, &[ExportFormat::Html], &collab).await.unwrap();
        assert_eq!(v1.version_number, 1);
        assert_eq!(v2.version_number, 2);
    }

    #[tokio::test]
    async fn delete_report_clears_history_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ReportPipeline::new(dir.path(), ReportPipelineConfig::default(), Arc::new(FixedClock::new(Utc::now())));
        let bundle = AnalysisBundle::default();
        let exporter = UnsupportedDocumentExporter;
        let template = StringTemplateRenderer;
        let chart = NullChartRenderer;
        pipeline.generate(&request(), &bundle, &[ExportFormat::Html], &collaborators(&exporter, &template, &chart)).await.unwrap();
        pipeline.delete_report("r1").await.unwrap();
        assert!(pipeline.version_history("r1").is_empty());
        let index = pipeline.storage().load_versions_index().await;
        assert!(!index.reports.contains_key("r1"));
    }
}
