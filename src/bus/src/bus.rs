//! The message bus itself (spec §4.1, §5).
//!
//! Delivery is at-most-once and not persisted across restarts: queues
//! live only in the `DashMap` below, matching spec's "no persistence"
//! guarantee. Per-recipient queues are independent `Mutex<BinaryHeap>`s,
//! so no global lock is ever held while a caller blocks on `receive`.

use crate::metrics::BusMetrics;
use crate::types::{Message, MessageType, PerRecipientQueue, QueuedMessage, BROADCAST};
use dashmap::DashMap;
use parking_lot::Mutex;
use patentflow_common::Clock;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_HISTORY_CAPACITY: usize = 2000;

/// Typed, priority-aware inter-worker message bus (C1).
pub struct MessageBus {
    clock: Arc<dyn Clock>,
    registered_workers: DashMap<String, ()>,
    queues: DashMap<String, Mutex<PerRecipientQueue>>,
    subscriptions: DashMap<String, HashSet<MessageType>>,
    history: Mutex<VecDeque<Message>>,
    history_capacity: usize,
    sequence: AtomicU64,
    metrics: BusMetrics,
}

impl MessageBus {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_history_capacity(clock, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(clock: Arc<dyn Clock>, history_capacity: usize) -> Self {
        Self {
            clock,
            registered_workers: DashMap::new(),
            queues: DashMap::new(),
            subscriptions: DashMap::new(),
            history: Mutex::new(VecDeque::new()),
            history_capacity,
            sequence: AtomicU64::new(0),
            metrics: BusMetrics::new(),
        }
    }

    /// Registers a worker id as a valid recipient/broadcast target.
    pub fn register_worker(&self, worker_id: &str) {
        self.registered_workers.insert(worker_id.to_string(), ());
        self.queues
            .entry(worker_id.to_string())
            .or_insert_with(|| Mutex::new(PerRecipientQueue::new()));
    }

    pub fn unregister_worker(&self, worker_id: &str) {
        self.registered_workers.remove(worker_id);
        self.queues.remove(worker_id);
        self.subscriptions.remove(worker_id);
    }

    /// Records interest for future fan-out; broadcast today already
    /// reaches every registered worker regardless (spec §4.1).
    pub fn subscribe(&self, worker_id: &str, types: &[MessageType]) {
        self.subscriptions
            .entry(worker_id.to_string())
            .or_default()
            .extend(types.iter().copied());
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn push_history(&self, message: Message) {
        let mut history = self.history.lock();
        if history.len() >= self.history_capacity {
            history.pop_front();
        }
        history.push_back(message);
    }

    /// Appends to the recipient's queue, or fans out to every other
    /// registered worker on `receiver_id == BROADCAST`.
    pub fn send(&self, message: Message) {
        self.metrics.sent.inc();
        if message.receiver_id == BROADCAST {
            let recipients: Vec<String> = self
                .registered_workers
                .iter()
                .map(|entry| entry.key().clone())
                .filter(|id| id != &message.sender_id)
                .collect();
            for recipient in recipients {
                let mut copy = message.clone();
                copy.receiver_id = recipient.clone();
                self.enqueue(&recipient, copy);
            }
            self.push_history(message);
            return;
        }
        self.enqueue(&message.receiver_id.clone(), message.clone());
        self.push_history(message);
    }

    fn enqueue(&self, recipient: &str, message: Message) {
        let sequence = self.next_sequence();
        let queue = self
            .queues
            .entry(recipient.to_string())
            .or_insert_with(|| Mutex::new(PerRecipientQueue::new()));
        queue.lock().push(QueuedMessage { message, sequence });
        debug!(recipient, "message enqueued");
    }

    /// Pops the highest-priority, then FIFO-oldest, message addressed to
    /// `worker_id`, marking it `processed = true`.
    pub fn receive(&self, worker_id: &str) -> Option<Message> {
        let queue = self.queues.get(worker_id)?;
        let mut queue = queue.lock();
        let mut entry = queue.pop()?;
        entry.message.processed = true;
        self.metrics.received.inc();
        Some(entry.message)
    }

    pub fn pending_count(&self, worker_id: &str) -> usize {
        self.queues
            .get(worker_id)
            .map(|q| q.lock().len())
            .unwrap_or(0)
    }

    pub fn history(&self) -> Vec<Message> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::fakes::SystemClock;
    use std::collections::HashMap;

    fn bus() -> MessageBus {
        MessageBus::new(Arc::new(SystemClock))
    }

    fn msg(sender: &str, receiver: &str, priority: i32, now: chrono::DateTime<chrono::Utc>) -> Message {
        Message::new(
            sender,
            receiver,
            MessageType::StatusUpdate,
            HashMap::new(),
            priority,
            now,
        )
    }

    #[test]
    fn fifo_among_equal_priority() {
        let bus = bus();
        bus.register_worker("r");
        let now = bus.now();
        let m1 = msg("s", "r", 1, now);
        let m2 = msg("s", "r", 1, now);
        let id1 = m1.message_id;
        let id2 = m2.message_id;
        bus.send(m1);
        bus.send(m2);
        assert_eq!(bus.receive("r").unwrap().message_id, id1);
        assert_eq!(bus.receive("r").unwrap().message_id, id2);
    }

    #[test]
    fn higher_priority_first() {
        let bus = bus();
        bus.register_worker("r");
        let now = bus.now();
        let low = msg("s", "r", 1, now);
        let high = msg("s", "r", 5, now);
        let high_id = high.message_id;
        bus.send(low);
        bus.send(high);
        assert_eq!(bus.receive("r").unwrap().message_id, high_id);
    }

    #[test]
    fn broadcast_skips_sender() {
        let bus = bus();
        bus.register_worker("a");
        bus.register_worker("b");
        bus.register_worker("c");
        let now = bus.now();
        bus.send(msg("a", BROADCAST, 0, now));
        assert!(bus.receive("a").is_none());
        assert!(bus.receive("b").is_some());
        assert!(bus.receive("c").is_some());
    }

    #[test]
    fn receive_marks_processed_and_removes() {
        let bus = bus();
        bus.register_worker("r");
        let now = bus.now();
        bus.send(msg("s", "r", 0, now));
        let received = bus.receive("r").unwrap();
        assert!(received.processed);
        assert!(bus.receive("r").is_none());
    }

    #[test]
    fn history_is_bounded() {
        let bus = MessageBus::with_history_capacity(Arc::new(SystemClock), 2);
        bus.register_worker("r");
        let now = bus.now();
        for _ in 0..5 {
            bus.send(msg("s", "r", 0, now));
        }
        assert_eq!(bus.history().len(), 2);
    }
}
