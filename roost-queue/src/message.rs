use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message group shared by every stay notification; ordering is per group.
pub const STAY_GROUP: &str = "Stays";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StayEventKind {
    #[serde(rename = "checkin")]
    CheckIn,
    #[serde(rename = "checkout")]
    CheckOut,
}

impl StayEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StayEventKind::CheckIn => "checkin",
            StayEventKind::CheckOut => "checkout",
        }
    }
}

impl fmt::Display for StayEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A check-in or check-out notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayMessage {
    pub event: StayEventKind,
    pub hotel_id: String,
    pub room_id: String,
    pub stay_id: String,
    pub group_id: String,
    pub body: String,
    /// Consumers drop repeats of the same id; one per stay and event.
    pub deduplication_id: String,
    pub emitted_at: DateTime<Utc>,
}

impl StayMessage {
    pub fn new(
        event: StayEventKind,
        hotel_id: impl Into<String>,
        room_id: impl Into<String>,
        stay_id: impl Into<String>,
    ) -> Self {
        let stay_id = stay_id.into();
        Self {
            event,
            hotel_id: hotel_id.into(),
            room_id: room_id.into(),
            group_id: STAY_GROUP.to_string(),
            body: format!("Stay {stay_id}"),
            deduplication_id: format!("{stay_id}:{event}"),
            stay_id,
            emitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_layout() {
        let m = StayMessage::new(StayEventKind::CheckOut, "H1", "R1", "S1");
        assert_eq!(m.group_id, "Stays");
        assert_eq!(m.body, "Stay S1");
        assert_eq!(m.deduplication_id, "S1:checkout");
        assert_eq!(serde_json::to_value(m.event).unwrap(), "checkout");
    }
}
