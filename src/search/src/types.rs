//! Request/response shapes for the search aggregator (spec §4.5).

use patentflow_common::SearchKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Cnki,
    Bocha,
    Web,
}

impl SourceId {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Cnki => "cnki",
            SourceId::Bocha => "bocha",
            SourceId::Web => "web",
        }
    }

    /// Base authority score per source (spec §4.5 step 5).
    pub fn base_authority(self) -> f64 {
        match self {
            SourceId::Cnki => 0.9,
            SourceId::Bocha => 0.7,
            SourceId::Web => 0.5,
        }
    }

    /// Deterministic failover chain for a failed source (spec §4.5 step 3):
    /// cnki→bocha→web, bocha→cnki→web, web→bocha→cnki.
    pub fn failover_chain(self) -> [SourceId; 2] {
        match self {
            SourceId::Cnki => [SourceId::Bocha, SourceId::Web],
            SourceId::Bocha => [SourceId::Cnki, SourceId::Web],
            SourceId::Web => [SourceId::Bocha, SourceId::Cnki],
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    pub search_type: SearchKind,
    pub limit: usize,
    pub sources: Vec<SourceId>,
}

/// A search hit after quality scoring (spec §4.5 step 5, "Result record
/// fields").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub title: String,
    pub url: String,
    pub content: String,
    pub source: String,
    pub search_type: SearchKind,
    pub relevance_score: f64,
    pub authority_score: f64,
    pub freshness_score: f64,
    pub completeness_score: f64,
    pub content_quality_score: f64,
    pub final_score: f64,
    pub is_degraded: bool,
    pub is_failover: bool,
    pub is_emergency_fallback: bool,
    pub metadata: HashMap<String, String>,
}
