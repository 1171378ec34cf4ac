//! Keyword extraction and clustering over patent titles/abstracts
//! (spec §4.8).

use once_cell::sync::Lazy;
use regex::Regex;

/// Seed keyword lists per technology area, doubling as the cluster
/// assignment table (first area whose list contains the keyword wins).
pub const TECH_AREAS: &[(&str, &[&str])] = &[
    ("人工智能", &["人工智能", "ai", "机器学习", "深度学习", "神经网络", "算法"]),
    ("区块链", &["区块链", "blockchain", "分布式账本", "智能合约", "加密货币"]),
    ("物联网", &["物联网", "iot", "传感器", "智能设备", "连接"]),
    ("5G通信", &["5g", "通信", "无线", "网络", "基站"]),
    ("新能源", &["新能源", "电池", "太阳能", "风能", "储能"]),
    ("生物技术", &["生物", "基因", "蛋白质", "细胞", "医疗"]),
    ("芯片技术", &["芯片", "半导体", "处理器", "集成电路", "微电子"]),
];

/// Canonical-area regex patterns, matched case-insensitively over the
/// combined title+abstract text.
static TECH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(人工智能|AI|机器学习|深度学习)",
        r"(区块链|blockchain)",
        r"(物联网|IoT)",
        r"(5G|通信技术)",
        r"(新能源|电池技术)",
        r"(生物技术|基因)",
        r"(芯片|半导体)",
        r"(云计算|大数据)",
        r"(虚拟现实|VR|增强现实|AR)",
        r"(自动驾驶|无人驾驶)",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
    .collect()
});

const COMMON_TECH_WORDS: &[&str] = &[
    "算法", "系统", "方法", "装置", "设备", "网络", "数据", "信息", "处理", "控制", "检测", "识别", "分析", "优化",
    "管理", "服务",
];

/// Extracts the deduplicated union of pattern matches and common
/// tech-term occurrences from the combined title/abstract text of a
/// patent corpus.
pub fn extract(texts: &[String]) -> Vec<String> {
    let combined = texts.join(" ").to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for pattern in TECH_PATTERNS.iter() {
        for capture in pattern.captures_iter(&combined) {
            if let Some(m) = capture.get(1) {
                keywords.push(m.as_str().to_string());
            }
        }
    }
    for word in COMMON_TECH_WORDS {
        if combined.contains(word) {
            keywords.push(word.to_string());
        }
    }

    keywords.sort();
    keywords.dedup();
    keywords
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KeywordCluster {
    pub domain: String,
    pub keywords: Vec<String>,
}

/// Maps each keyword to the first tech area whose seed list contains
/// it (case-insensitive substring match); unmatched keywords form an
/// "其他技术" cluster. Clusters are ranked by size, descending.
pub fn cluster(keywords: &[String]) -> Vec<KeywordCluster> {
    let mut clusters: Vec<KeywordCluster> = Vec::new();
    let mut classified: std::collections::HashSet<String> = std::collections::HashSet::new();

    for (domain, seeds) in TECH_AREAS {
        let matched: Vec<String> = keywords
            .iter()
            .filter(|kw| seeds.iter().any(|seed| kw.to_lowercase().contains(seed)))
            .cloned()
            .collect();
        if !matched.is_empty() {
            classified.extend(matched.iter().cloned());
            clusters.push(KeywordCluster { domain: domain.to_string(), keywords: matched });
        }
    }

    let unclassified: Vec<String> = keywords.iter().filter(|kw| !classified.contains(*kw)).cloned().collect();
    if !unclassified.is_empty() {
        clusters.push(KeywordCluster { domain: "其他技术".to_string(), keywords: unclassified });
    }

    clusters.sort_by(|a, b| b.keywords.len().cmp(&a.keywords.len()));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_finds_pattern_and_common_words() {
        let texts = vec!["一种基于人工智能的图像识别系统".to_string()];
        let keywords = extract(&texts);
        assert!(keywords.contains(&"人工智能".to_string()));
        assert!(keywords.contains(&"系统".to_string()));
        assert!(keywords.contains(&"识别".to_string()));
    }

    #[test]
    fn cluster_groups_by_seed_domain() {
        let keywords = vec!["人工智能".to_string(), "系统".to_string()];
        let clusters = cluster(&keywords);
        let ai = clusters.iter().find(|c| c.domain == "人工智能").unwrap();
        assert_eq!(ai.keywords, vec!["人工智能".to_string()]);
        let other = clusters.iter().find(|c| c.domain == "其他技术");
        assert!(other.is_some());
    }

    #[test]
    fn empty_keywords_yield_no_clusters() {
        assert!(cluster(&[]).is_empty());
    }
}
