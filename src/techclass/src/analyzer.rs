//! Wires IPC distribution, keyword extraction/clustering, and
//! technology evolution into the single `classify` entry point (spec
//! §4.8).

use crate::evolution;
use crate::ipc;
use crate::keywords;
use crate::metrics::TechClassifierMetrics;
use patentflow_common::{CoreError, CoreResult, PatentRecord, TechnologyResult};
use std::collections::HashMap;
use tracing::info;

pub struct TechClassifier {
    metrics: TechClassifierMetrics,
}

impl TechClassifier {
    pub fn new() -> Self {
        Self { metrics: TechClassifierMetrics::new() }
    }

    pub fn metrics(&self) -> &TechClassifierMetrics {
        &self.metrics
    }

    pub fn classify(&self, records: &[PatentRecord]) -> CoreResult<TechnologyResult> {
        let started = std::time::Instant::now();
        let result = self.classify_inner(records);
        self.metrics.record(result.is_ok(), started.elapsed().as_secs_f64());
        if let Err(err) = &result {
            info!(error = %err, "technology classification returned insufficient_data");
        }
        result
    }

    fn classify_inner(&self, records: &[PatentRecord]) -> CoreResult<TechnologyResult> {
        if records.is_empty() {
            return Err(CoreError::insufficient_data("no patent records to classify"));
        }

        let ipc_classes_per_record: Vec<Vec<String>> = records.iter().map(|r| r.ipc_classes.clone()).collect();
        let (ipc_distribution, ipc_labels) = ipc::distribution(&ipc_classes_per_record);

        let texts: Vec<String> = records
            .iter()
            .flat_map(|r| vec![r.title.clone(), r.abstract_text.clone().unwrap_or_default()])
            .filter(|s| !s.is_empty())
            .collect();
        let keyword_list = keywords::extract(&texts);
        let keyword_clusters = keywords::cluster(&keyword_list);
        let clusters: HashMap<String, Vec<String>> =
            keyword_clusters.iter().map(|c| (c.domain.clone(), c.keywords.clone())).collect();

        let dated_texts: Vec<(i32, String)> = records
            .iter()
            .filter_map(|r| {
                r.year().map(|year| (year, format!("{} {}", r.title, r.abstract_text.clone().unwrap_or_default())))
            })
            .collect();
        let tech_evolution = evolution::evolution(&dated_texts);
        let evolution_verdict: HashMap<String, String> = tech_evolution
            .iter()
            .filter_map(|(domain, yearly)| evolution::verdict(yearly).map(|v| (domain.clone(), v.to_string())))
            .collect();

        let mut ranked_ipc: Vec<(&String, &u64)> = ipc_distribution.iter().collect();
        ranked_ipc.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let mut main_technologies: Vec<String> = ranked_ipc
            .iter()
            .take(3)
            .map(|(prefix, _)| ipc::label_for(prefix))
            .collect();

        if let Some(largest) = keyword_clusters.first() {
            for keyword in &largest.keywords {
                if !main_technologies.contains(keyword) {
                    main_technologies.push(keyword.clone());
                }
            }
        }
        main_technologies.truncate(10);

        Ok(TechnologyResult {
            ipc_distribution,
            ipc_labels,
            keywords: keyword_list,
            clusters,
            main_technologies,
            evolution: tech_evolution,
            evolution_verdict,
        })
    }
}

impl Default for TechClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, ipc: &str, year: &str) -> PatentRecord {
        PatentRecord {
            title: title.to_string(),
            ipc_classes: vec![ipc.to_string()],
            application_date: year.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn classify_end_to_end() {
        let classifier = TechClassifier::new();
        let records = vec![
            record("人工智能图像识别系统", "G06F1234", "2020"),
            record("人工智能算法优化装置", "G06F5678", "2021"),
            record("无线通信基站设备", "H04L0001", "2021"),
        ];
        let result = classifier.classify(&records).unwrap();
        assert_eq!(result.ipc_distribution.get("G06F"), Some(&2));
        assert!(result.main_technologies.contains(&"数据处理系统".to_string()));
        assert!(result.clusters.contains_key("人工智能"));
    }

    #[test]
    fn empty_input_is_insufficient_data() {
        let classifier = TechClassifier::new();
        let err = classifier.classify(&[]).unwrap_err();
        assert_eq!(err.kind, patentflow_common::ErrorKind::InsufficientData);
    }
}
