//! Per-worker state tracked by the load balancer (spec §3 `WorkerRecord`,
//! projected onto the fields C2 owns: capacity, load, specialties,
//! performance samples).

use std::collections::{HashSet, VecDeque};

pub const GENERAL_SPECIALTY: &str = "general";
pub const PERFORMANCE_RING_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct WorkerState {
    pub capacity: u32,
    pub load: u32,
    pub specialties: HashSet<String>,
    pub performance_samples: VecDeque<f64>,
}

impl WorkerState {
    pub fn new(capacity: u32, specialties: HashSet<String>) -> Self {
        Self {
            capacity,
            load: 0,
            specialties,
            performance_samples: VecDeque::new(),
        }
    }

    pub fn handles_specialty(&self, task_type: &str) -> bool {
        self.specialties.contains(task_type) || self.specialties.contains(GENERAL_SPECIALTY)
    }

    pub fn load_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.load as f64 / self.capacity as f64
    }

    pub fn mean_performance(&self) -> Option<f64> {
        if self.performance_samples.is_empty() {
            None
        } else {
            Some(self.performance_samples.iter().sum::<f64>() / self.performance_samples.len() as f64)
        }
    }

    /// `(1 − mean(performance_samples)) * 0.1`; zero with no samples
    /// (spec §4.2 step 3).
    pub fn performance_bonus(&self) -> f64 {
        self.mean_performance()
            .map(|mean| (1.0 - mean) * 0.1)
            .unwrap_or(0.0)
    }

    pub fn push_sample(&mut self, sample: f64) {
        self.performance_samples.push_back(sample);
        while self.performance_samples.len() > PERFORMANCE_RING_CAPACITY {
            self.performance_samples.pop_front();
        }
    }
}
