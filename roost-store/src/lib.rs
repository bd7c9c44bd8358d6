//! roost-store: hotels, rooms and stays in a single key/value table.
//!
//! [`keys`] defines the composite key scheme, [`kv`] the store contract and
//! [`memory`] an in-process implementation. [`repository`] builds typed CRUD
//! with cascading deletes on top.

pub mod entity;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod repository;
pub mod retry;

pub use entity::{
    Entity, Hotel, HotelDraft, HotelPatch, Room, RoomDraft, RoomPatch, Stay, StayDraft, StayPatch,
    StayState,
};
pub use keys::{DecodedKey, EntityKind, ItemKey, KeyError};
pub use kv::{Item, KvStore, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repository::{
    EntityRepository, HotelRepository, RepoError, RepoResult, Repositories, RoomRepository,
    StayRepository, Updated,
};
pub use retry::RetryPolicy;
