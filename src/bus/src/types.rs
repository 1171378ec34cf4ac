//! Message types for the inter-worker bus (spec §3 `Message`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::BinaryHeap;
use std::cmp::Ordering;
use uuid::Uuid;

/// The sentinel recipient id that fans a message out to every registered
/// worker except the sender (spec §4.1).
pub const BROADCAST: &str = "broadcast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    TaskAssignment,
    TaskResult,
    TaskFailed,
    DataShare,
    CollaborationStart,
    CollaborationEnd,
    DependencyResolved,
    Heartbeat,
    StatusUpdate,
}

impl MessageType {
    /// Whether this message type expects the recipient to reply
    /// (spec §3: `response_required` is derived from `message_type`).
    pub fn response_required(self) -> bool {
        matches!(
            self,
            MessageType::TaskAssignment | MessageType::CollaborationStart
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub message_type: MessageType,
    pub content: HashMap<String, Value>,
    pub priority: i32,
    pub timestamp: DateTime<Utc>,
    pub processed: bool,
}

impl Message {
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        message_type: MessageType,
        content: HashMap<String, Value>,
        priority: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            message_type,
            content,
            priority,
            timestamp: now,
            processed: false,
        }
    }

    pub fn response_required(&self) -> bool {
        self.message_type.response_required()
    }
}

/// Queue entry ordering: highest `priority` first, then FIFO among equal
/// priority (spec §4.1, §5 ordering guarantee (a), §8 invariant 3).
/// `sequence` is a monotonically increasing enqueue counter, not a
/// timestamp, so two same-millisecond sends still order correctly.
#[derive(Debug, Clone)]
pub(crate) struct QueuedMessage {
    pub message: Message,
    pub sequence: u64,
}

impl PartialEq for QueuedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.message.message_id == other.message.message_id
    }
}
impl Eq for QueuedMessage {}

impl Ord for QueuedMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.message
            .priority
            .cmp(&other.message.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(crate) type PerRecipientQueue = BinaryHeap<QueuedMessage>;
