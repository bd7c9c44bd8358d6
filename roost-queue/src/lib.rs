//! roost-queue: check-in/check-out notifications.

pub mod memory;
pub mod message;
pub mod notifier;
pub mod queue;

pub use memory::MemoryQueue;
pub use message::{StayEventKind, StayMessage, STAY_GROUP};
pub use notifier::Notifier;
pub use queue::{NotificationQueue, QueueError, QueueResult, SendReceipt};
