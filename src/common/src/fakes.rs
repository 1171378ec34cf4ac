//! Deterministic fakes of the §6 external collaborators, for tests that
//! exercise components without a real scraper, LLM, or PDF backend.

use crate::error::{CoreError, CoreResult};
use crate::interfaces::{
    ChartRenderer, Clock, DocumentExporter, MonitoringSink, RawSearchRecord, RenderedChart,
    SearchKind, SearchSource, TemplateRenderer, TextGenerator,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A clock pinned to a fixed instant, advanceable by tests that need to
/// observe TTL expiry deterministically (spec §8 invariant 9).
#[derive(Clone)]
pub struct FixedClock {
    millis: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(at.timestamp_millis())),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        self.millis
            .fetch_add(duration.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or_else(Utc::now)
    }
}

/// The real wall clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A search source that replays a scripted set of records (or a health
/// flag) instead of reaching the network.
pub struct ScriptedSearchSource {
    name: String,
    records: Vec<RawSearchRecord>,
    healthy: Arc<Mutex<bool>>,
    fail_first_n_calls: Arc<Mutex<u32>>,
}

impl ScriptedSearchSource {
    pub fn new(name: impl Into<String>, records: Vec<RawSearchRecord>) -> Self {
        Self {
            name: name.into(),
            records,
            healthy: Arc::new(Mutex::new(true)),
            fail_first_n_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock() = healthy;
    }

    /// Makes the next `n` `search()` calls return a network error, then
    /// succeed — for exercising C5's retry-with-backoff path.
    pub fn fail_next_calls(&self, n: u32) {
        *self.fail_first_n_calls.lock() = n;
    }
}

#[async_trait]
impl SearchSource for ScriptedSearchSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        keywords: &[String],
        _kind: SearchKind,
        limit: usize,
    ) -> CoreResult<Vec<RawSearchRecord>> {
        {
            let mut remaining = self.fail_first_n_calls.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CoreError::network(format!(
                    "{} temporarily unreachable",
                    self.name
                )));
            }
        }
        let keyword_set: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let filtered: Vec<RawSearchRecord> = self
            .records
            .iter()
            .filter(|r| {
                keyword_set.is_empty()
                    || keyword_set.iter().any(|k| {
                        r.title.to_lowercase().contains(k) || r.content.to_lowercase().contains(k)
                    })
            })
            .cloned()
            .take(limit)
            .collect();
        Ok(filtered)
    }

    async fn health(&self) -> bool {
        *self.healthy.lock()
    }

    async fn close(&self) {}
}

/// Formats the prompt into a deterministic, prompt-derived string instead
/// of calling a model.
#[derive(Default)]
pub struct TemplateTextGenerator;

#[async_trait]
impl TextGenerator for TemplateTextGenerator {
    async fn generate(&self, prompt: &str) -> CoreResult<String> {
        Ok(format!("[generated] {}", prompt.trim()))
    }
}

/// Records chart specs without rendering pixels.
#[derive(Default)]
pub struct NullChartRenderer;

#[async_trait]
impl ChartRenderer for NullChartRenderer {
    async fn render(&self, spec: &Value) -> CoreResult<RenderedChart> {
        let format = spec
            .get("chart_type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(RenderedChart {
            path: format!("charts/{}.svg", format),
            size: spec.to_string().len() as u64,
            format,
        })
    }
}

/// Renders templates by interpolating `data` into a minimal string
/// instead of a real template engine.
#[derive(Default)]
pub struct StringTemplateRenderer;

#[async_trait]
impl TemplateRenderer for StringTemplateRenderer {
    async fn render(&self, template_name: &str, data: &Value) -> CoreResult<String> {
        Ok(format!(
            "<html><!-- template:{} --><body>{}</body></html>",
            template_name, data
        ))
    }
}

/// Always raises `export_unsupported`, exercising the §4.11 HTML-fallback
/// export path.
#[derive(Default)]
pub struct UnsupportedDocumentExporter;

#[async_trait]
impl DocumentExporter for UnsupportedDocumentExporter {
    async fn html_to_pdf(&self, _html: &str, _options: &Value) -> CoreResult<Vec<u8>> {
        Err(CoreError::export_unsupported(
            "no PDF backend configured in this environment",
        ))
    }
}

/// Collects recorded metrics/alerts into memory for test assertions.
#[derive(Default, Clone)]
pub struct RecordingMonitoringSink {
    inner: Arc<Mutex<RecordingMonitoringSinkInner>>,
}

#[derive(Default)]
struct RecordingMonitoringSinkInner {
    metrics: Vec<(String, HashMap<String, f64>)>,
    alerts: Vec<Value>,
}

impl RecordingMonitoringSink {
    pub fn metrics(&self) -> Vec<(String, HashMap<String, f64>)> {
        self.inner.lock().metrics.clone()
    }

    pub fn alerts(&self) -> Vec<Value> {
        self.inner.lock().alerts.clone()
    }
}

#[async_trait]
impl MonitoringSink for RecordingMonitoringSink {
    async fn record_metrics(&self, namespace: &str, fields: HashMap<String, f64>) {
        self.inner
            .lock()
            .metrics
            .push((namespace.to_string(), fields));
    }

    async fn send_alert(&self, alert: Value) {
        self.inner.lock().alerts.push(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let start = Utc::now();
        let clock = FixedClock::new(start);
        clock.advance(chrono::Duration::seconds(3600));
        assert!(clock.now() >= start + chrono::Duration::seconds(3600));
    }

    #[tokio::test]
    async fn scripted_source_fails_then_succeeds() {
        let source = ScriptedSearchSource::new(
            "cnki",
            vec![RawSearchRecord {
                title: "A patent about batteries".into(),
                url: "http://x".into(),
                content: "battery content".into(),
                source: "cnki".into(),
                published_year: Some(2023),
                metadata: HashMap::new(),
            }],
        );
        source.fail_next_calls(1);
        let first = source.search(&["battery".into()], SearchKind::Patent, 5).await;
        assert!(first.is_err());
        let second = source.search(&["battery".into()], SearchKind::Patent, 5).await;
        assert_eq!(second.unwrap().len(), 1);
    }
}
