//! Typed records and their mapping onto stored rows.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::keys::{EntityKind, ItemKey, KeyError};
use crate::kv::Item;

/// A record stored under the composite key scheme.
///
/// The serialized form exposes `id` and the parent field (`hotelId`,
/// `roomId`); those are derived from the key and never stored as attributes.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Fields supplied on creation.
    type Draft: Send + Sync;
    /// Fields supplied on update. Absent fields serialize to nothing and
    /// keep their stored value.
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &str;
    fn parent_id(&self) -> Option<&str>;
    fn from_draft(id: String, parent_id: Option<String>, draft: Self::Draft, now: DateTime<Utc>)
        -> Self;

    fn key(&self) -> Result<ItemKey, KeyError> {
        Self::KIND.encode(self.parent_id(), self.id())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("record does not serialize to an object")]
    NotAnObject,
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Split a record into its key and stored attributes.
pub fn to_item<E: Entity>(entity: &E) -> Result<Item, RecordError> {
    let key = entity.key()?;
    let Value::Object(mut attrs) = serde_json::to_value(entity)? else {
        return Err(RecordError::NotAnObject);
    };
    attrs.remove("id");
    if let Some(field) = E::KIND.parent_field() {
        attrs.remove(field);
    }
    Ok(Item::new(key, attrs))
}

/// Rebuild a record from a stored row, renaming the key parts into
/// `id` and the parent field.
pub fn from_item<E: Entity>(item: Item) -> Result<E, RecordError> {
    let decoded = E::KIND.decode(&item.key)?;
    let mut attrs = item.attrs;
    attrs.insert("id".into(), Value::String(decoded.own_id));
    if let (Some(field), Some(parent)) = (E::KIND.parent_field(), decoded.parent_id) {
        attrs.insert(field.into(), Value::String(parent));
    }
    Ok(serde_json::from_value(Value::Object(attrs))?)
}

/// The attributes an update writes: only the fields `patch` supplies,
/// plus `updatedAt`.
pub fn patch_attributes<E: Entity>(
    patch: &E::Patch,
    now: DateTime<Utc>,
) -> Result<Map<String, Value>, RecordError> {
    let Value::Object(mut attrs) = serde_json::to_value(patch)? else {
        return Err(RecordError::NotAnObject);
    };
    attrs.insert("updatedAt".into(), serde_json::to_value(now)?);
    Ok(attrs)
}

/// Treats `null`, `""` and a missing field alike.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

// ---- Hotel ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_water_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HotelDraft {
    pub name: String,
    pub description: Option<String>,
    pub electricity_cost: Option<f64>,
    pub hot_water_cost: Option<f64>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HotelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hot_water_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

impl Entity for Hotel {
    const KIND: EntityKind = EntityKind::Hotel;
    type Draft = HotelDraft;
    type Patch = HotelPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn from_draft(id: String, _parent: Option<String>, d: HotelDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: d.name,
            description: d.description,
            electricity_cost: d.electricity_cost,
            hot_water_cost: d.hot_water_cost,
            country: d.country,
            city: d.city,
            address: d.address,
            zipcode: d.zipcode,
            created_at: now,
            updated_at: now,
        }
    }

}

// ---- Room ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub number: String,
    pub floor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomDraft {
    pub number: String,
    pub floor: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i64>,
}

impl Entity for Room {
    const KIND: EntityKind = EntityKind::Room;
    type Draft = RoomDraft;
    type Patch = RoomPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.hotel_id)
    }

    fn from_draft(id: String, parent: Option<String>, d: RoomDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            hotel_id: parent.unwrap_or_default(),
            number: d.number,
            floor: d.floor,
            created_at: now,
            updated_at: now,
        }
    }

}

// ---- Stay ----

/// Lifecycle of a stay: open until it gets an `endTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    pub id: String,
    pub room_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stay {
    pub fn state(&self) -> StayState {
        match self.end_time {
            None => StayState::Open,
            Some(_) => StayState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == StayState::Open
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StayDraft {
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StayPatch {
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
}

impl Entity for Stay {
    const KIND: EntityKind = EntityKind::Stay;
    type Draft = StayDraft;
    type Patch = StayPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.room_id)
    }

    fn from_draft(id: String, parent: Option<String>, d: StayDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            room_id: parent.unwrap_or_default(),
            start_time: d.start_time,
            end_time: d.end_time,
            created_at: now,
            updated_at: now,
        }
    }

}
