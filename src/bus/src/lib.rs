//! # patentflow-bus — C1 Message Bus
//!
//! Typed, priority-aware inter-worker messaging with pub/sub by type and
//! per-recipient queues (spec §4.1).

pub mod bus;
pub mod metrics;
pub mod types;

pub use bus::MessageBus;
pub use metrics::BusMetrics;
pub use types::{Message, MessageType, BROADCAST};
