use async_trait::async_trait;
use roost_core::{ErrorKind, RoostError};
use thiserror::Error;
use uuid::Uuid;

use crate::message::StayMessage;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    #[error("message rejected: {0}")]
    Rejected(String),
}

impl From<QueueError> for RoostError {
    fn from(err: QueueError) -> Self {
        RoostError::of(ErrorKind::ServerError).with_source(err)
    }
}

/// Outcome of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Uuid,
    /// `true` when the deduplication id was already seen and the message
    /// was dropped.
    pub duplicate: bool,
}

/// External queue for stay notifications. Delivery is at least once.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn send(&self, message: StayMessage) -> QueueResult<SendReceipt>;
}
