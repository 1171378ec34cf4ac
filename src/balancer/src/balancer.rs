//! Worker selection and performance tracking (spec §4.2, §8 invariant 2).

use crate::metrics::BalancerMetrics;
use crate::types::WorkerState;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::debug;

/// Specialty-aware load balancer: tracks per-worker capacity, current
/// load, and a rolling performance ring, and picks the least-loaded,
/// best-performing candidate for a task type (C2).
#[derive(Default)]
pub struct LoadBalancer {
    workers: DashMap<String, WorkerState>,
    metrics: BalancerMetrics,
}

impl LoadBalancer {
    pub fn new() -> Self {
        Self {
            workers: DashMap::new(),
            metrics: BalancerMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &BalancerMetrics {
        &self.metrics
    }

    pub fn register_worker(&self, worker_id: &str, capacity: u32, specialties: HashSet<String>) {
        self.workers
            .insert(worker_id.to_string(), WorkerState::new(capacity, specialties));
        self.metrics.workers_registered.inc();
    }

    pub fn remove_worker(&self, worker_id: &str) {
        if self.workers.remove(worker_id).is_some() {
            self.metrics.workers_registered.dec();
        }
    }

    pub fn load(&self, worker_id: &str) -> Option<u32> {
        self.workers.get(worker_id).map(|w| w.load)
    }

    /// Raises the worker's load by one, floored at `capacity` (callers
    /// are expected to have checked capacity via `select_worker` first).
    pub fn increment_load(&self, worker_id: &str) {
        if let Some(mut worker) = self.workers.get_mut(worker_id) {
            worker.load = worker.load.saturating_add(1);
        }
    }

    /// `record_completion` (spec §4.2): appends a performance sample and
    /// decrements load, floored at zero.
    pub fn record_completion(&self, worker_id: &str, execution_time_s: f64, success: bool) {
        if let Some(mut worker) = self.workers.get_mut(worker_id) {
            let clamped_time = execution_time_s.max(1e-9);
            let sample = if success { 1.0 } else { 0.0 } * (30.0 / clamped_time).min(1.0);
            worker.push_sample(sample);
            worker.load = worker.load.saturating_sub(1);
        }
        self.metrics.completions_recorded.inc();
    }

    /// Selects the best candidate for `task_type` among `candidates`
    /// (spec §4.2 `select_worker`). Returns `None` if every candidate is
    /// at capacity.
    pub fn select_worker(&self, task_type: &str, candidates: &[String]) -> Option<String> {
        let specialized: Vec<&String> = candidates
            .iter()
            .filter(|id| {
                self.workers
                    .get(id.as_str())
                    .map(|w| w.handles_specialty(task_type))
                    .unwrap_or(false)
            })
            .collect();

        let pool: Vec<&String> = if specialized.is_empty() {
            candidates.iter().collect()
        } else {
            specialized
        };

        let mut best: Option<(String, f64)> = None;
        for worker_id in pool {
            let Some(worker) = self.workers.get(worker_id.as_str()) else {
                continue;
            };
            if worker.load >= worker.capacity {
                continue;
            }
            let score = worker.load_ratio() - worker.performance_bonus();
            match &best {
                None => best = Some((worker_id.clone(), score)),
                Some((best_id, best_score)) => {
                    if score < *best_score || (score == *best_score && worker_id < best_id) {
                        best = Some((worker_id.clone(), score));
                    }
                }
            }
        }

        if let Some((id, score)) = &best {
            debug!(worker_id = %id, score, "selected worker");
            self.metrics.selections_made.inc();
        } else {
            self.metrics.selections_exhausted.inc();
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specialties(tags: &[&str]) -> HashSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    /// S5 Load balancing scenario (spec §8): W1 (load=2, mean perf=1.0)
    /// beats W2 (load=2, mean perf=0.5) at equal capacity/load.
    #[test]
    fn s5_prefers_higher_performance() {
        let balancer = LoadBalancer::new();
        balancer.register_worker("w1", 5, specialties(&["general"]));
        balancer.register_worker("w2", 5, specialties(&["general"]));
        {
            let mut w1 = balancer.workers.get_mut("w1").unwrap();
            w1.load = 2;
            w1.push_sample(1.0);
        }
        {
            let mut w2 = balancer.workers.get_mut("w2").unwrap();
            w2.load = 2;
            w2.push_sample(0.5);
        }

        let picked = balancer.select_worker("search", &["w1".into(), "w2".into()]);
        assert_eq!(picked, Some("w1".to_string()));
    }

    #[test]
    fn skips_workers_at_capacity() {
        let balancer = LoadBalancer::new();
        balancer.register_worker("full", 1, specialties(&["general"]));
        balancer.register_worker("free", 1, specialties(&["general"]));
        balancer.increment_load("full");
        let picked = balancer.select_worker("x", &["full".into(), "free".into()]);
        assert_eq!(picked, Some("free".to_string()));
    }

    #[test]
    fn falls_back_to_all_candidates_when_none_specialized() {
        let balancer = LoadBalancer::new();
        balancer.register_worker("w1", 5, specialties(&["analysis"]));
        let picked = balancer.select_worker("search", &["w1".into()]);
        assert_eq!(picked, Some("w1".to_string()));
    }

    #[test]
    fn ties_break_on_worker_id() {
        let balancer = LoadBalancer::new();
        balancer.register_worker("b", 5, specialties(&["general"]));
        balancer.register_worker("a", 5, specialties(&["general"]));
        let picked = balancer.select_worker("x", &["b".into(), "a".into()]);
        assert_eq!(picked, Some("a".to_string()));
    }

    #[test]
    fn performance_ring_bounded_at_100() {
        let balancer = LoadBalancer::new();
        balancer.register_worker("w", 5, specialties(&["general"]));
        for _ in 0..150 {
            balancer.record_completion("w", 1.0, true);
        }
        let worker = balancer.workers.get("w").unwrap();
        assert_eq!(worker.performance_samples.len(), 100);
    }
}
