use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::message::StayMessage;
use crate::queue::{NotificationQueue, QueueError, QueueResult, SendReceipt};

#[derive(Default)]
struct Inner {
    messages: VecDeque<StayMessage>,
    /// deduplication id -> first accepted at
    seen: HashMap<String, Instant>,
}

/// In-memory FIFO queue with a deduplication window, for tests and
/// local development.
#[derive(Clone)]
pub struct MemoryQueue {
    inner: Arc<RwLock<Inner>>,
    dedup_window: Duration,
    failing: Arc<AtomicBool>,
    attempts: Arc<AtomicUsize>,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl MemoryQueue {
    pub fn new(dedup_window: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            dedup_window,
            failing: Arc::new(AtomicBool::new(false)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reject every send until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sends attempted, including failed and duplicate ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Messages waiting, oldest first.
    pub fn sent(&self) -> Vec<StayMessage> {
        self.inner.read().messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().messages.is_empty()
    }

    /// Take the oldest message.
    pub fn receive(&self) -> Option<StayMessage> {
        self.inner.write().messages.pop_front()
    }
}

#[async_trait]
impl NotificationQueue for MemoryQueue {
    async fn send(&self, message: StayMessage) -> QueueResult<SendReceipt> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("memory queue switched off".into()));
        }

        let now = Instant::now();
        let mut inner = self.inner.write();
        let window = self.dedup_window;
        inner.seen.retain(|_, at| now.duration_since(*at) < window);

        let message_id = Uuid::now_v7();
        if inner.seen.contains_key(&message.deduplication_id) {
            return Ok(SendReceipt {
                message_id,
                duplicate: true,
            });
        }

        inner.seen.insert(message.deduplication_id.clone(), now);
        inner.messages.push_back(message);
        Ok(SendReceipt {
            message_id,
            duplicate: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StayEventKind;

    fn checkout(stay: &str) -> StayMessage {
        StayMessage::new(StayEventKind::CheckOut, "H1", "R1", stay)
    }

    #[tokio::test(start_paused = true)]
    async fn duplicates_inside_the_window_are_dropped() {
        let q = MemoryQueue::new(Duration::from_secs(60));

        assert!(!q.send(checkout("S1")).await.unwrap().duplicate);
        assert!(q.send(checkout("S1")).await.unwrap().duplicate);
        assert!(!q.send(checkout("S2")).await.unwrap().duplicate);
        assert_eq!(q.len(), 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!q.send(checkout("S1")).await.unwrap().duplicate);
        assert_eq!(q.len(), 3);
        assert_eq!(q.attempts(), 4);
    }

    #[tokio::test]
    async fn check_in_and_check_out_are_distinct() {
        let q = MemoryQueue::default();
        q.send(StayMessage::new(StayEventKind::CheckIn, "H1", "R1", "S1"))
            .await
            .unwrap();
        q.send(checkout("S1")).await.unwrap();

        let first = q.receive().unwrap();
        assert_eq!(first.event, StayEventKind::CheckIn);
        assert_eq!(q.receive().unwrap().event, StayEventKind::CheckOut);
        assert!(q.receive().is_none());
    }

    #[tokio::test]
    async fn failing_queue_counts_attempts() {
        let q = MemoryQueue::default();
        q.set_failing(true);
        assert!(matches!(
            q.send(checkout("S1")).await,
            Err(QueueError::Unavailable(_))
        ));
        assert_eq!(q.attempts(), 1);
        assert!(q.is_empty());
    }
}
