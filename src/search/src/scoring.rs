//! Quality scoring heuristics (spec §4.5 step 5), ported from
//! `search_agent.py`'s `_assess_*`/`_calculate_semantic_relevance`
//! family into the English-keyword form this workspace's domain uses.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const TECH_TERMS: &[&str] = &[
    "technology",
    "method",
    "system",
    "algorithm",
    "model",
    "analysis",
    "research",
];

static SEMANTIC_EXPANSION: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (
            "ai",
            [
                "machine learning",
                "deep learning",
                "neural network",
                "artificial intelligence",
            ]
            .as_slice(),
        ),
        (
            "artificial intelligence",
            ["ai", "machine learning", "deep learning", "neural network"].as_slice(),
        ),
        (
            "blockchain",
            ["distributed ledger", "cryptocurrency", "smart contract"].as_slice(),
        ),
        ("iot", ["internet of things", "sensor", "smart device", "connected device"].as_slice()),
        ("5g", ["fifth generation", "wireless communication", "mobile network"].as_slice()),
        (
            "renewable energy",
            ["clean energy", "solar power", "wind power", "battery storage"].as_slice(),
        ),
        (
            "biotechnology",
            ["gene", "protein", "cell", "molecular biology"].as_slice(),
        ),
        (
            "semiconductor",
            ["integrated circuit", "processor", "microprocessor", "chip"].as_slice(),
        ),
    ])
});

/// Expands `keywords` with domain-adjacent terms (spec §4.5 "optional
/// semantic expansion table").
fn expand_semantically(keywords: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();
    for keyword in keywords {
        let key = keyword.to_lowercase();
        if let Some(related) = SEMANTIC_EXPANSION.get(key.as_str()) {
            for term in *related {
                expanded.push(term.to_string());
            }
        }
    }
    expanded.sort();
    expanded.dedup();
    expanded
}

/// `relevance` (spec §4.5 step 5): keyword hit rate with title hits
/// weighted ×2, blended with a lower-weighted semantic-expansion hit rate.
pub fn relevance_score(title: &str, content: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.5;
    }
    let title_lower = title.to_lowercase();
    let content_lower = content.to_lowercase();

    let weighted: f64 = keywords
        .iter()
        .map(|kw| {
            let kw = kw.to_lowercase();
            if title_lower.contains(&kw) {
                2.0
            } else if content_lower.contains(&kw) {
                1.0
            } else {
                0.0
            }
        })
        .sum();
    let direct_rate = (weighted / (2.0 * keywords.len() as f64)).min(1.0);

    let expanded = expand_semantically(keywords);
    let semantic_rate = if expanded.is_empty() {
        0.0
    } else {
        let combined = format!("{title_lower} {content_lower}");
        let hits = expanded.iter().filter(|term| combined.contains(term.as_str())).count();
        hits as f64 / expanded.len() as f64
    };

    (direct_rate * 0.8 + semantic_rate * 0.2).min(1.0)
}

/// `authority` (spec §4.5 step 5): source base score, discounted for
/// degraded/failover results, pinned low for emergency fallback.
pub fn authority_score(base: f64, is_degraded: bool, is_failover: bool, is_emergency_fallback: bool) -> f64 {
    if is_emergency_fallback {
        return 0.1;
    }
    let mut score = base;
    if is_degraded {
        score *= 0.8;
    }
    if is_failover {
        score *= 0.9;
    }
    score
}

/// `freshness` (spec §4.5 step 5), by publication year relative to
/// `current_year`. Records with no known year default to 0.5 (the
/// original treats a missing timestamp as "medium" freshness).
pub fn freshness_score(published_year: Option<i32>, current_year: i32) -> f64 {
    let Some(year) = published_year else {
        return 0.5;
    };
    let age = (current_year - year).max(0);
    match age {
        0 => 1.0,
        1 => 0.8,
        2 => 0.6,
        years => (1.0 - 0.2 * years as f64).max(0.3),
    }
}

/// `completeness` (spec §4.5 step 5): 0.7·required + 0.3·optional field
/// presence ratio.
pub fn completeness_score(
    has_title: bool,
    has_content: bool,
    has_url: bool,
    has_summary: bool,
    has_publication_date: bool,
    has_source: bool,
) -> f64 {
    let required = [has_title, has_content, has_url];
    let optional = [has_summary, has_publication_date, has_source];
    let required_ratio = required.iter().filter(|p| **p).count() as f64 / required.len() as f64;
    let optional_ratio = optional.iter().filter(|p| **p).count() as f64 / optional.len() as f64;
    required_ratio * 0.7 + optional_ratio * 0.3
}

/// `content_quality` (spec §4.5 step 5): length, sentence presence, and
/// technical-term density heuristics.
pub fn content_quality_score(title: &str, content: &str) -> f64 {
    let mut score = 0.5;
    if content.len() > 200 {
        score += 0.2;
    } else if content.len() > 100 {
        score += 0.1;
    }
    if title.len() > 10 && title.len() < 100 {
        score += 0.1;
    }
    if content.contains('.') || content.contains('\u{3002}') {
        score += 0.1;
    }
    let content_lower = content.to_lowercase();
    let term_count = TECH_TERMS.iter().filter(|term| content_lower.contains(*term)).count();
    if term_count >= 2 {
        score += 0.1;
    }
    score.min(1.0)
}

/// `final` (spec §4.5 step 5): the weighted composite driving ranking.
pub fn final_score(content_quality: f64, relevance: f64, authority: f64, freshness: f64) -> f64 {
    (0.3 * content_quality + 0.35 * relevance + 0.2 * authority + 0.15 * freshness).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_hits_outweigh_body_hits() {
        let title_hit = relevance_score("battery technology", "irrelevant filler text", &["battery".into()]);
        let body_hit = relevance_score("unrelated title", "discusses battery improvements", &["battery".into()]);
        assert!(title_hit > body_hit);
    }

    #[test]
    fn emergency_fallback_pins_low_authority() {
        assert_eq!(authority_score(0.9, false, false, true), 0.1);
    }

    #[test]
    fn degraded_and_failover_discount_authority() {
        let base = 0.9;
        let degraded = authority_score(base, true, false, false);
        let failover = authority_score(base, false, true, false);
        assert!((degraded - 0.72).abs() < 1e-9);
        assert!((failover - 0.81).abs() < 1e-9);
    }

    #[test]
    fn freshness_decays_with_age() {
        assert_eq!(freshness_score(Some(2024), 2024), 1.0);
        assert_eq!(freshness_score(Some(2023), 2024), 0.8);
        assert_eq!(freshness_score(Some(2022), 2024), 0.6);
        assert_eq!(freshness_score(None, 2024), 0.5);
    }
}
