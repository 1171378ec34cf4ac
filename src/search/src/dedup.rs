//! Content-signature deduplication (spec §4.5 step 4), ported from
//! `search_agent.py`'s `_generate_content_signature`/
//! `_calculate_signature_similarity`.

use std::collections::BTreeSet;

/// `{title-top-10-words-sorted} | {content-top-50-words-sorted-first-25}`
/// (spec §4.5 step 4).
pub fn content_signature(title: &str, content: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let title_words: BTreeSet<String> = title
        .to_lowercase()
        .split_whitespace()
        .take(10)
        .map(str::to_string)
        .collect();
    let mut content_top_50: Vec<String> = content
        .to_lowercase()
        .split_whitespace()
        .take(50)
        .map(str::to_string)
        .collect();
    content_top_50.sort_unstable();
    content_top_50.truncate(25);
    let content_words: BTreeSet<String> = content_top_50.into_iter().collect();
    (title_words, content_words)
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Jaccard-mean of the title and content parts of two signatures (spec
/// §4.5 step 4: "Jaccard-mean of the two parts").
pub fn signature_similarity(
    a: &(BTreeSet<String>, BTreeSet<String>),
    b: &(BTreeSet<String>, BTreeSet<String>),
) -> f64 {
    (jaccard(&a.0, &b.0) + jaccard(&a.1, &b.1)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_similarity_one() {
        let sig = content_signature("battery technology advances", "new battery chemistry improves density");
        assert_eq!(signature_similarity(&sig, &sig), 1.0);
    }

    #[test]
    fn unrelated_content_has_low_similarity() {
        let a = content_signature("battery technology advances", "new battery chemistry improves density");
        let b = content_signature("quantum computing breakthrough", "qubit coherence time extended significantly");
        assert!(signature_similarity(&a, &b) < 0.2);
    }
}
