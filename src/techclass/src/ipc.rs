//! IPC-prefix distribution and label mapping (spec §4.8).

use std::collections::HashMap;

/// Known 4-character IPC prefixes, mapped to a human-readable label.
/// Unknown prefixes fall back to `"其他分类(<code>)"`.
const IPC_LABELS: &[(&str, &str)] = &[
    ("G06F", "数据处理系统"),
    ("H04L", "数字信息传输"),
    ("G06N", "人工智能"),
    ("H04W", "无线通信网络"),
    ("G06Q", "数据处理系统或方法"),
    ("H01L", "半导体器件"),
    ("G06K", "数据识别"),
    ("H04N", "图像通信"),
    ("G06T", "图像数据处理"),
    ("G01S", "无线电定位"),
];

pub fn label_for(prefix: &str) -> String {
    IPC_LABELS
        .iter()
        .find(|(code, _)| *code == prefix)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("其他分类({prefix})"))
}

/// Counts patents by 4-character IPC prefix and returns both the raw
/// distribution and the label-keyed distribution (spec §4.8 distinct
/// `ipc_distribution`/`ipc_categories` views, merged here since both
/// downstream consumers only need the label view plus raw codes).
pub fn distribution(ipc_classes_per_record: &[Vec<String>]) -> (HashMap<String, u64>, HashMap<String, String>) {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for classes in ipc_classes_per_record {
        for ipc in classes {
            let prefix = ipc.chars().take(4).collect::<String>();
            if prefix.is_empty() {
                continue;
            }
            *counts.entry(prefix).or_insert(0) += 1;
        }
    }
    let labels = counts.keys().map(|prefix| (prefix.clone(), label_for(prefix))).collect();
    (counts, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefix_maps_to_label() {
        assert_eq!(label_for("G06F"), "数据处理系统");
    }

    #[test]
    fn unknown_prefix_falls_back() {
        assert_eq!(label_for("Z99Z"), "其他分类(Z99Z)");
    }

    #[test]
    fn distribution_counts_by_prefix() {
        let input = vec![vec!["G06F1234".to_string()], vec!["G06F5678".to_string(), "H04L0001".to_string()]];
        let (counts, labels) = distribution(&input);
        assert_eq!(counts.get("G06F"), Some(&2));
        assert_eq!(counts.get("H04L"), Some(&1));
        assert_eq!(labels.get("G06F").unwrap(), "数据处理系统");
    }
}
