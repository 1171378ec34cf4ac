//! Market concentration metrics over an applicant → patent-count
//! histogram (spec §4.7, §8 invariant 6).

use std::collections::HashMap;

/// HHI, CR4, CR8, and Gini over `counts`, plus the §4.7 concentration
/// level. `HHI` is bounded `[1/n, 1]` for `n` distinct applicants; `CR4`
/// and `Gini` are bounded `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcentrationMetrics {
    pub hhi: f64,
    pub cr4: f64,
    pub cr8: f64,
    pub gini: f64,
}

pub fn compute(counts: &HashMap<String, u64>) -> ConcentrationMetrics {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return ConcentrationMetrics::default();
    }

    let mut sorted: Vec<u64> = counts.values().copied().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let hhi = sorted
        .iter()
        .map(|&c| {
            let share = c as f64 / total as f64;
            share * share
        })
        .sum();

    let cr4 = sorted.iter().take(4).sum::<u64>() as f64 / total as f64;
    let cr8 = sorted.iter().take(8).sum::<u64>() as f64 / total as f64;
    let gini = gini_coefficient(&sorted);

    ConcentrationMetrics { hhi, cr4, cr8, gini }
}

/// Gini coefficient over a (descending) list of counts, computed on the
/// ascending order the formula expects.
fn gini_coefficient(descending: &[u64]) -> f64 {
    if descending.len() <= 1 {
        return 0.0;
    }
    let mut ascending = descending.to_vec();
    ascending.sort_unstable();
    let n = ascending.len() as f64;
    let cumsum: u64 = ascending.iter().sum();
    if cumsum == 0 {
        return 0.0;
    }
    let weighted: f64 = ascending
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64 + 1.0) * v as f64)
        .sum();
    let gini = (2.0 * weighted) / (n * cumsum as f64) - (n + 1.0) / n;
    gini.clamp(0.0, 1.0)
}

/// §4.7 concentration-level thresholds.
pub fn concentration_level(hhi: f64, cr4: f64) -> &'static str {
    if hhi > 0.25 || cr4 > 0.6 {
        "高度集中"
    } else if hhi > 0.15 || cr4 > 0.4 {
        "中度集中"
    } else if hhi > 0.1 || cr4 > 0.25 {
        "适度集中"
    } else {
        "竞争充分"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    /// S2 HHI scenario (spec §8): shares 0.5/0.3/0.2, HHI=0.38, CR4=1.0.
    #[test]
    fn s2_hhi_scenario() {
        let metrics = compute(&counts(&[("A", 50), ("B", 30), ("C", 20)]));
        assert!((metrics.hhi - 0.38).abs() < 1e-9);
        assert!((metrics.cr4 - 1.0).abs() < 1e-9);
        assert_eq!(concentration_level(metrics.hhi, metrics.cr4), "高度集中");
    }

    #[test]
    fn hhi_and_gini_are_bounded() {
        let metrics = compute(&counts(&[("A", 1), ("B", 1), ("C", 1), ("D", 1)]));
        let n = 4.0;
        assert!(metrics.hhi >= 1.0 / n - 1e-9 && metrics.hhi <= 1.0);
        assert!(metrics.gini >= 0.0 && metrics.gini <= 1.0);
        assert!(metrics.cr4 >= 0.0 && metrics.cr4 <= 1.0);
    }

    #[test]
    fn empty_histogram_yields_zeroed_metrics() {
        let metrics = compute(&HashMap::new());
        assert_eq!(metrics.hhi, 0.0);
        assert_eq!(metrics.gini, 0.0);
    }
}
