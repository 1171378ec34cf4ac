//! # patentflow — Patent Analysis Multi-Agent Orchestration Kernel
//!
//! Wires the eleven component crates (message bus, load balancer, task
//! registry, collaboration manager, search aggregator, trend/competition/
//! technology analyzers, the two quality controllers, and the report
//! pipeline) into a single `PatentOrchestrator` facade, plus the platform
//! runtime (configuration, tracing, a Prometheus endpoint, graceful
//! shutdown) the CLI driver binary boots.

pub mod orchestrator;
pub mod platform;

pub use orchestrator::{AnalysisOutcome, PatentOrchestrator};
pub use platform::{PatentflowConfig, Platform, PlatformContext, PlatformRuntime};

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::fakes::{FixedClock, ScriptedSearchSource};
    use patentflow_common::PatentRecord;
    use patentflow_search::SourceId;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn orchestrator() -> PatentOrchestrator {
        let config = PatentflowConfig::default();
        let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
        let mut sources: HashMap<SourceId, Arc<dyn patentflow_common::SearchSource>> = HashMap::new();
        sources.insert(SourceId::Web, Arc::new(ScriptedSearchSource::new("web", Vec::new())));
        PatentOrchestrator::new(&config, clock, sources, None)
    }

    #[test]
    fn orchestrator_boots_with_default_config() {
        let orchestrator = orchestrator();
        assert_eq!(orchestrator.registry.active_count(), 0);
    }

    #[test]
    fn analyze_on_empty_records_yields_insufficient_data_and_still_reports_quality() {
        let orchestrator = orchestrator();
        let outcome = orchestrator.analyze("run-1", &[]);
        assert!(outcome.bundle.trend.is_none());
        assert!(outcome.quality.overall_quality >= 0.0);
    }

    #[tokio::test]
    async fn run_search_records_a_workflow_quality_check() {
        let orchestrator = orchestrator();
        let request = patentflow_search::SearchRequest {
            keywords: vec!["battery".to_string()],
            search_type: patentflow_common::SearchKind::Patent,
            limit: 5,
            sources: vec![SourceId::Web],
        };
        let _ = orchestrator.run_search("wf1", request).await;
        assert!(orchestrator.workflow_quality.report("wf1").is_some());
    }

    fn sample_records() -> Vec<PatentRecord> {
        (2018..=2023)
            .map(|year| PatentRecord {
                application_number: format!("US{year}0001"),
                title: "A widget assembly".to_string(),
                applicants: vec!["Acme Corp".to_string()],
                application_date: format!("{year}-01-01"),
                ipc_classes: vec!["G06F0001".to_string()],
                country: "US".to_string(),
                abstract_text: None,
                inventors: Vec::new(),
                publication_date: None,
                status: None,
            })
            .collect()
    }

    #[test]
    fn analyze_with_enough_records_produces_a_full_bundle() {
        let orchestrator = orchestrator();
        let outcome = orchestrator.analyze("run-2", &sample_records());
        assert!(outcome.bundle.trend.is_some());
        assert!(outcome.bundle.competition.is_some());
        assert!(outcome.bundle.technology.is_some());
    }
}
