//! # patentflow-balancer — C2 Load Balancer
//!
//! Per-worker capacity and rolling performance tracking with
//! specialty-aware worker selection (spec §4.2).

pub mod balancer;
pub mod metrics;
pub mod types;

pub use balancer::LoadBalancer;
pub use metrics::BalancerMetrics;
pub use types::WorkerState;
