//! Pairwise competitor similarity over IPC-prefix sets (spec §4.7).

use patentflow_common::CompetitorPair;
use std::collections::{HashMap, HashSet};

const TOP_N: usize = 10;
const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Jaccard similarity among the top 10 applicants (by distinct IPC-prefix
/// count) of `applicant_ipc_prefixes`; pairs scoring above the threshold
/// are reported as direct competitors.
pub fn competitor_pairs(applicant_ipc_prefixes: &HashMap<String, HashSet<String>>) -> Vec<CompetitorPair> {
    let mut by_breadth: Vec<(&String, &HashSet<String>)> = applicant_ipc_prefixes.iter().collect();
    by_breadth.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
    let top: Vec<(&String, &HashSet<String>)> = by_breadth.into_iter().take(TOP_N).collect();

    let mut pairs = Vec::new();
    for i in 0..top.len() {
        for j in (i + 1)..top.len() {
            let (name_a, set_a) = top[i];
            let (name_b, set_b) = top[j];
            let intersection = set_a.intersection(set_b).count();
            let union = set_a.union(set_b).count();
            if union == 0 {
                continue;
            }
            let similarity = intersection as f64 / union as f64;
            if similarity > SIMILARITY_THRESHOLD {
                pairs.push(CompetitorPair {
                    a: name_a.clone(),
                    b: name_b.clone(),
                    similarity,
                });
            }
        }
    }
    pairs.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pairs_above_threshold_are_reported() {
        let mut map = HashMap::new();
        map.insert("A".to_string(), set(&["G06F", "H04L", "G06N"]));
        map.insert("B".to_string(), set(&["G06F", "H04L", "G01S"]));
        map.insert("C".to_string(), set(&["H01L"]));

        let pairs = competitor_pairs(&map);
        assert!(pairs.iter().any(|p| (p.a == "A" && p.b == "B") || (p.a == "B" && p.b == "A")));
        assert!(!pairs.iter().any(|p| p.a == "C" || p.b == "C"));
    }

    #[test]
    fn no_overlap_yields_no_pairs() {
        let mut map = HashMap::new();
        map.insert("A".to_string(), set(&["G06F"]));
        map.insert("B".to_string(), set(&["H01L"]));
        assert!(competitor_pairs(&map).is_empty());
    }
}
