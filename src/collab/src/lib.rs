//! # patentflow-collab — C4 Collaboration Manager
//!
//! Owns the worker table and wires C1 (bus), C2 (load balancer), and C3
//! (task registry) together behind `assign_task`/`complete_task`/
//! `fail_task`, the retry policy, heartbeat cleanup, and collaboration
//! sessions (spec §4.4).

pub mod manager;
pub mod metrics;
pub mod types;

pub use manager::{CollaborationManager, FailOutcome};
pub use metrics::CollabMetrics;
pub use types::{CollaborationSession, WorkerRecord, WorkerStatus};
