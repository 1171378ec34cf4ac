//! The search aggregator pipeline (spec §4.5): health gate, parallel
//! search with retry/degradation/failover, dedup, quality scoring, rank,
//! and a diversity pass.

use crate::dedup::{content_signature, signature_similarity};
use crate::health::SourceHealthTracker;
use crate::metrics::SearchMetrics;
use crate::scoring;
use crate::types::{ScoredRecord, SearchRequest, SourceId};
use dashmap::DashMap;
use patentflow_common::{Clock, RawSearchRecord, SearchSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 2;
const FAILOVER_CAP: usize = 5;
const EMERGENCY_CAP: usize = 5;
const DIVERSITY_CAP: usize = 20;
const RANK_TIE_WINDOW: f64 = 0.05;

#[derive(Debug, Clone)]
struct TaggedRecord {
    raw: RawSearchRecord,
    is_degraded: bool,
    is_failover: bool,
    is_emergency_fallback: bool,
}

pub struct SearchAggregator {
    sources: HashMap<SourceId, Arc<dyn SearchSource>>,
    health: DashMap<SourceId, SourceHealthTracker>,
    clock: Arc<dyn Clock>,
    retry_backoff: Vec<Duration>,
    metrics: SearchMetrics,
}

impl SearchAggregator {
    pub fn new(sources: HashMap<SourceId, Arc<dyn SearchSource>>, clock: Arc<dyn Clock>) -> Self {
        Self::with_backoff(sources, clock, vec![Duration::from_secs(1), Duration::from_secs(2)])
    }

    /// Same pipeline with an injectable backoff schedule, so tests don't
    /// pay the real 1s/2s retry delay (spec §4.5 step 2).
    pub fn with_backoff(
        sources: HashMap<SourceId, Arc<dyn SearchSource>>,
        clock: Arc<dyn Clock>,
        retry_backoff: Vec<Duration>,
    ) -> Self {
        Self {
            sources,
            health: DashMap::new(),
            clock,
            retry_backoff,
            metrics: SearchMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    fn current_year(&self) -> i32 {
        self.clock.now().format("%Y").to_string().parse().unwrap_or(1970)
    }

    async fn search_with_retry(
        &self,
        source_id: SourceId,
        keywords: &[String],
        kind: patentflow_common::SearchKind,
        limit: usize,
    ) -> Vec<RawSearchRecord> {
        let Some(source) = self.sources.get(&source_id) else {
            return Vec::new();
        };
        let mut attempt = 0;
        loop {
            let started = std::time::Instant::now();
            match source.search(keywords, kind, limit).await {
                Ok(records) => {
                    self.record_health(source_id, true, started.elapsed().as_secs_f64());
                    return records;
                }
                Err(err) => {
                    self.record_health(source_id, false, started.elapsed().as_secs_f64());
                    warn!(source = %source_id, attempt, error = %err, "search attempt failed");
                    if attempt >= MAX_RETRIES {
                        return Vec::new();
                    }
                    if let Some(delay) = self.retry_backoff.get(attempt as usize) {
                        tokio::time::sleep(*delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    fn record_health(&self, source_id: SourceId, success: bool, latency_secs: f64) {
        self.health
            .entry(source_id)
            .or_insert_with(SourceHealthTracker::new)
            .record(success, latency_secs);
    }

    async fn degraded_search(&self, source_id: SourceId, request: &SearchRequest) -> Vec<RawSearchRecord> {
        self.metrics.degraded_searches.inc();
        let simplified_keywords: Vec<String> = request.keywords.iter().take(2).cloned().collect();
        let simplified_limit = request.limit.min(10);
        let Some(source) = self.sources.get(&source_id) else {
            return Vec::new();
        };
        source
            .search(&simplified_keywords, patentflow_common::SearchKind::General, simplified_limit)
            .await
            .unwrap_or_default()
    }

    fn emergency_fallback(&self, request: &SearchRequest) -> Vec<ScoredRecord> {
        let topic = request.keywords.first().cloned().unwrap_or_else(|| "technology".to_string());
        let count = request.limit.min(EMERGENCY_CAP);
        (0..count)
            .map(|i| {
                let title = format!("[emergency fallback] basic information about {topic} ({})", i + 1);
                let content = format!(
                    "All search services are temporarily unavailable. This is placeholder \
                     information about {topic}; please retry later."
                );
                ScoredRecord {
                    url: format!("https://emergency-fallback.local/{}", i + 1),
                    source: "emergency".to_string(),
                    search_type: request.search_type,
                    relevance_score: 0.1,
                    authority_score: 0.1,
                    freshness_score: 0.5,
                    completeness_score: scoring::completeness_score(true, true, true, false, false, true),
                    content_quality_score: scoring::content_quality_score(&title, &content),
                    final_score: 0.1,
                    is_degraded: false,
                    is_failover: false,
                    is_emergency_fallback: true,
                    metadata: HashMap::new(),
                    title,
                    content,
                }
            })
            .collect()
    }

    /// `search` (spec §4.5): the full seven-step pipeline.
    pub async fn search(&self, request: SearchRequest) -> Vec<ScoredRecord> {
        self.metrics.searches_run.inc();

        let mut healthy = Vec::new();
        for source_id in &request.sources {
            if let Some(source) = self.sources.get(source_id) {
                let tracker_ok = self.health.get(source_id).map(|t| t.is_healthy()).unwrap_or(true);
                if source.health().await && tracker_ok {
                    healthy.push(*source_id);
                }
            }
        }

        if healthy.is_empty() {
            warn!("no healthy search sources, using emergency fallback");
            self.metrics.emergency_fallbacks.inc();
            return self.emergency_fallback(&request);
        }

        let mut tagged: Vec<TaggedRecord> = Vec::new();
        let mut failed_sources: Vec<SourceId> = Vec::new();

        for source_id in &healthy {
            let records = self
                .search_with_retry(*source_id, &request.keywords, request.search_type, request.limit)
                .await;
            if !records.is_empty() {
                tagged.extend(records.into_iter().map(|raw| TaggedRecord {
                    raw,
                    is_degraded: false,
                    is_failover: false,
                    is_emergency_fallback: false,
                }));
                continue;
            }
            debug!(source = %source_id, "no results, trying degraded search");
            let degraded = self.degraded_search(*source_id, &request).await;
            if !degraded.is_empty() {
                tagged.extend(degraded.into_iter().map(|raw| TaggedRecord {
                    raw,
                    is_degraded: true,
                    is_failover: false,
                    is_emergency_fallback: false,
                }));
            } else {
                failed_sources.push(*source_id);
            }
        }

        for failed_source in &failed_sources {
            self.metrics.failovers.inc();
            for failover_source in failed_source.failover_chain() {
                if failed_sources.contains(&failover_source) {
                    continue;
                }
                let records = self
                    .search_with_retry(failover_source, &request.keywords, request.search_type, request.limit)
                    .await;
                if !records.is_empty() {
                    debug!(from = %failed_source, to = %failover_source, "failover succeeded");
                    tagged.extend(records.into_iter().take(FAILOVER_CAP).map(|mut raw| {
                        raw.metadata.insert("original_source".to_string(), failed_source.to_string());
                        raw.metadata.insert("failover_source".to_string(), failover_source.to_string());
                        TaggedRecord {
                            raw,
                            is_degraded: false,
                            is_failover: true,
                            is_emergency_fallback: false,
                        }
                    }));
                    break;
                }
            }
        }

        if tagged.is_empty() {
            self.metrics.emergency_fallbacks.inc();
            return self.emergency_fallback(&request);
        }

        let deduped = self.deduplicate(tagged, &request.keywords);
        let mut scored = self.score(deduped, &request.keywords, request.search_type);
        self.rank(&mut scored);
        self.diversify(scored, request.limit)
    }

    fn deduplicate(&self, records: Vec<TaggedRecord>, keywords: &[String]) -> Vec<TaggedRecord> {
        let mut kept: Vec<TaggedRecord> = Vec::new();
        let mut kept_signatures: Vec<(std::collections::BTreeSet<String>, std::collections::BTreeSet<String>)> =
            Vec::new();

        for record in records {
            let signature = content_signature(&record.raw.title, &record.raw.content);
            let mut duplicate_of = None;
            for (i, existing_sig) in kept_signatures.iter().enumerate() {
                if signature_similarity(&signature, existing_sig) > 0.8 {
                    duplicate_of = Some(i);
                    break;
                }
            }
            match duplicate_of {
                None => {
                    kept_signatures.push(signature);
                    kept.push(record);
                }
                Some(i) => {
                    let existing_quality =
                        scoring::relevance_score(&kept[i].raw.title, &kept[i].raw.content, keywords);
                    let candidate_quality = scoring::relevance_score(&record.raw.title, &record.raw.content, keywords);
                    if candidate_quality > existing_quality {
                        kept_signatures[i] = signature;
                        kept[i] = record;
                    }
                }
            }
        }
        kept
    }

    fn score(
        &self,
        records: Vec<TaggedRecord>,
        keywords: &[String],
        search_type: patentflow_common::SearchKind,
    ) -> Vec<ScoredRecord> {
        let current_year = self.current_year();
        records
            .into_iter()
            .map(|record| {
                let source_base = source_id_from_str(&record.raw.source).map(SourceId::base_authority).unwrap_or(0.5);
                let relevance = scoring::relevance_score(&record.raw.title, &record.raw.content, keywords);
                let authority = scoring::authority_score(
                    source_base,
                    record.is_degraded,
                    record.is_failover,
                    record.is_emergency_fallback,
                );
                let freshness = scoring::freshness_score(record.raw.published_year, current_year);
                let completeness = scoring::completeness_score(
                    !record.raw.title.is_empty(),
                    !record.raw.content.is_empty(),
                    !record.raw.url.is_empty(),
                    record.raw.metadata.contains_key("summary"),
                    record.raw.published_year.is_some(),
                    !record.raw.source.is_empty(),
                );
                let content_quality = scoring::content_quality_score(&record.raw.title, &record.raw.content);
                let final_score = scoring::final_score(content_quality, relevance, authority, freshness);

                ScoredRecord {
                    title: record.raw.title,
                    url: record.raw.url,
                    content: record.raw.content,
                    source: record.raw.source,
                    search_type,
                    relevance_score: relevance,
                    authority_score: authority,
                    freshness_score: freshness,
                    completeness_score: completeness,
                    content_quality_score: content_quality,
                    final_score,
                    is_degraded: record.is_degraded,
                    is_failover: record.is_failover,
                    is_emergency_fallback: record.is_emergency_fallback,
                    metadata: record.raw.metadata,
                }
            })
            .collect()
    }

    /// Rank by `final_score`; within [`RANK_TIE_WINDOW`] of each other,
    /// break ties by freshness (spec §4.5 step 6).
    fn rank(&self, records: &mut [ScoredRecord]) {
        records.sort_by(|a, b| {
            if (a.final_score - b.final_score).abs() < RANK_TIE_WINDOW {
                b.freshness_score
                    .partial_cmp(&a.freshness_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            } else {
                b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal)
            }
        });
    }

    /// Greedy diversity pass (spec §4.5 step 7).
    fn diversify(&self, records: Vec<ScoredRecord>, limit: usize) -> Vec<ScoredRecord> {
        let cap = limit.min(DIVERSITY_CAP);
        if records.len() <= 1 {
            return records;
        }
        let signatures: Vec<_> = records.iter().map(|r| content_signature(&r.title, &r.content)).collect();

        let mut selected_idx = vec![0usize];
        let mut remaining: Vec<usize> = (1..records.len()).collect();

        while selected_idx.len() < cap && !remaining.is_empty() {
            let mut best_pos = 0;
            let mut best_score = f64::MIN;
            for (pos, &candidate) in remaining.iter().enumerate() {
                let max_similarity = selected_idx
                    .iter()
                    .map(|&s| signature_similarity(&signatures[candidate], &signatures[s]))
                    .fold(0.0_f64, f64::max);
                let combined = 0.7 * records[candidate].final_score + 0.3 * (1.0 - max_similarity);
                if combined > best_score {
                    best_score = combined;
                    best_pos = pos;
                }
            }
            selected_idx.push(remaining.remove(best_pos));
        }

        selected_idx.into_iter().map(|i| records[i].clone()).collect()
    }
}

fn source_id_from_str(source: &str) -> Option<SourceId> {
    match source.to_lowercase().as_str() {
        "cnki" => Some(SourceId::Cnki),
        "bocha" => Some(SourceId::Bocha),
        "web" => Some(SourceId::Web),
        _ => None,
    }
}
