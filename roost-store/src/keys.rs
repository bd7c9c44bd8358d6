//! Composite partition/sort key scheme.
//!
//! | entity | pk               | sk                 |
//! |--------|------------------|--------------------|
//! | Hotel  | `HOTEL#<hotel>`  | `METADATA#<hotel>` |
//! | Room   | `HOTEL#<hotel>`  | `ROOM#<room>`      |
//! | Stay   | `ROOM#<room>`    | `STAY#<stay>`      |
//!
//! A secondary index over `sk` alone resolves any record by its own id.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HOTEL_PREFIX: &str = "HOTEL#";
pub const METADATA_PREFIX: &str = "METADATA#";
pub const ROOM_PREFIX: &str = "ROOM#";
pub const STAY_PREFIX: &str = "STAY#";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("{kind} ids must not be empty")]
    EmptyId { kind: EntityKind },

    #[error("{kind} keys need a parent id")]
    MissingParent { kind: EntityKind },

    #[error("`{key}` does not start with `{expected}`")]
    WrongPrefix { key: String, expected: &'static str },

    #[error("hotel key mismatch: pk `{pk}` vs sk `{sk}`")]
    HotelMismatch { pk: String, sk: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Hotel,
    Room,
    Stay,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Hotel => "hotel",
            EntityKind::Room => "room",
            EntityKind::Stay => "stay",
        }
    }

    /// Sort-key prefix of the entity's own row.
    pub fn sort_prefix(&self) -> &'static str {
        match self {
            EntityKind::Hotel => METADATA_PREFIX,
            EntityKind::Room => ROOM_PREFIX,
            EntityKind::Stay => STAY_PREFIX,
        }
    }

    /// Partition-key prefix of the entity's own row.
    pub fn partition_prefix(&self) -> &'static str {
        match self {
            EntityKind::Hotel | EntityKind::Room => HOTEL_PREFIX,
            EntityKind::Stay => ROOM_PREFIX,
        }
    }

    pub fn parent(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Hotel => None,
            EntityKind::Room => Some(EntityKind::Hotel),
            EntityKind::Stay => Some(EntityKind::Room),
        }
    }

    pub fn child(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Hotel => Some(EntityKind::Room),
            EntityKind::Room => Some(EntityKind::Stay),
            EntityKind::Stay => None,
        }
    }

    /// Name of the field the parent id is exposed under.
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            EntityKind::Hotel => None,
            EntityKind::Room => Some("hotelId"),
            EntityKind::Stay => Some("roomId"),
        }
    }

    /// `sk` of the row with this own id, used for index lookups.
    pub fn sort_key(&self, id: &str) -> String {
        format!("{}{}", self.sort_prefix(), id)
    }

    /// `pk` shared by the children of the record with id `id`.
    pub fn child_partition(&self, id: &str) -> Option<String> {
        match self {
            EntityKind::Hotel => Some(format!("{HOTEL_PREFIX}{id}")),
            EntityKind::Room => Some(format!("{ROOM_PREFIX}{id}")),
            EntityKind::Stay => None,
        }
    }

    /// `(pk, sk)` for a record. The parent is ignored for hotels.
    pub fn encode(&self, parent_id: Option<&str>, own_id: &str) -> Result<ItemKey, KeyError> {
        if own_id.is_empty() {
            return Err(KeyError::EmptyId { kind: *self });
        }
        let pk = match self {
            EntityKind::Hotel => format!("{HOTEL_PREFIX}{own_id}"),
            EntityKind::Room | EntityKind::Stay => {
                let parent = parent_id
                    .filter(|p| !p.is_empty())
                    .ok_or(KeyError::MissingParent { kind: *self })?;
                format!("{}{}", self.partition_prefix(), parent)
            }
        };
        Ok(ItemKey::new(pk, self.sort_key(own_id)))
    }

    pub fn decode(&self, key: &ItemKey) -> Result<DecodedKey, KeyError> {
        let own_id = strip(&key.sk, self.sort_prefix())?;
        let parent = strip(&key.pk, self.partition_prefix())?;
        match self {
            EntityKind::Hotel => {
                if parent != own_id {
                    return Err(KeyError::HotelMismatch {
                        pk: key.pk.clone(),
                        sk: key.sk.clone(),
                    });
                }
                Ok(DecodedKey {
                    parent_id: None,
                    own_id: own_id.to_string(),
                })
            }
            EntityKind::Room | EntityKind::Stay => Ok(DecodedKey {
                parent_id: Some(parent.to_string()),
                own_id: own_id.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip<'a>(value: &'a str, prefix: &'static str) -> Result<&'a str, KeyError> {
    match value.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => Ok(rest),
        _ => Err(KeyError::WrongPrefix {
            key: value.to_string(),
            expected: prefix,
        }),
    }
}

/// Primary key of one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pk, self.sk)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub parent_id: Option<String>,
    pub own_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn layout_matches_table() {
        let k = EntityKind::Hotel.encode(None, "h1").unwrap();
        assert_eq!(k, ItemKey::new("HOTEL#h1", "METADATA#h1"));

        let k = EntityKind::Room.encode(Some("h1"), "r1").unwrap();
        assert_eq!(k, ItemKey::new("HOTEL#h1", "ROOM#r1"));

        let k = EntityKind::Stay.encode(Some("r1"), "s1").unwrap();
        assert_eq!(k, ItemKey::new("ROOM#r1", "STAY#s1"));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert_eq!(
            EntityKind::Room.encode(None, "r1"),
            Err(KeyError::MissingParent {
                kind: EntityKind::Room
            })
        );
        assert!(matches!(
            EntityKind::Stay.encode(Some("r1"), ""),
            Err(KeyError::EmptyId { .. })
        ));
        assert!(matches!(
            EntityKind::Room.decode(&ItemKey::new("HOTEL#h1", "STAY#s1")),
            Err(KeyError::WrongPrefix { .. })
        ));
        assert!(matches!(
            EntityKind::Hotel.decode(&ItemKey::new("HOTEL#h1", "METADATA#h2")),
            Err(KeyError::HotelMismatch { .. })
        ));
    }

    #[test]
    fn child_partitions() {
        assert_eq!(EntityKind::Hotel.child_partition("h1").unwrap(), "HOTEL#h1");
        assert_eq!(EntityKind::Room.child_partition("r1").unwrap(), "ROOM#r1");
        assert!(EntityKind::Stay.child_partition("s1").is_none());
    }

    proptest! {
        #[test]
        fn hotel_keys_round_trip(id in "[a-zA-Z0-9#-]{1,40}") {
            let key = EntityKind::Hotel.encode(None, &id).unwrap();
            let decoded = EntityKind::Hotel.decode(&key).unwrap();
            prop_assert_eq!(decoded, DecodedKey { parent_id: None, own_id: id });
        }

        #[test]
        fn child_keys_round_trip(
            parent in "[a-zA-Z0-9#-]{1,40}",
            id in "[a-zA-Z0-9#-]{1,40}",
            stay in any::<bool>(),
        ) {
            let kind = if stay { EntityKind::Stay } else { EntityKind::Room };
            let key = kind.encode(Some(&parent), &id).unwrap();
            let decoded = kind.decode(&key).unwrap();
            prop_assert_eq!(decoded, DecodedKey { parent_id: Some(parent), own_id: id });
        }
    }
}
