//! Generic CRUD over the composite key scheme.

mod stays;

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use roost_core::{ErrorKind, RoostError};
use thiserror::Error;
use uuid::Uuid;

use crate::entity::{self, Entity, Hotel, RecordError, Room, Stay};
use crate::keys::{EntityKind, ItemKey, KeyError};
use crate::kv::{Item, KvStore, StoreError};
use crate::retry::RetryPolicy;

pub use stays::StayRepository;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{count} rows share sort key `{sk}`")]
    DuplicateKey { sk: String, count: usize },

    #[error("room `{room_id}` already has an open stay")]
    OpenStayExists { room_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        RepoError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}

impl From<RepoError> for RoostError {
    fn from(err: RepoError) -> Self {
        let kind = match &err {
            RepoError::NotFound { .. } => ErrorKind::NotFound,
            RepoError::OpenStayExists { .. } => ErrorKind::Conflict,
            _ => ErrorKind::ServerError,
        };
        RoostError::of(kind).with_source(err)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Record before and after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated<E> {
    pub previous: E,
    pub current: E,
}

/// CRUD for one entity type over a shared [`KvStore`].
pub struct EntityRepository<E> {
    store: Arc<dyn KvStore>,
    retry: RetryPolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            retry: self.retry,
            _entity: PhantomData,
        }
    }
}

pub type HotelRepository = EntityRepository<Hotel>;
pub type RoomRepository = EntityRepository<Room>;

impl<E: Entity> EntityRepository<E> {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            _entity: PhantomData,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Fetch a record by its own id.
    ///
    /// Hotels are a point read on `(HOTEL#id, METADATA#id)`. Rooms and stays
    /// go through the `sk` index, which may lag; `NotFound` is retried per
    /// the repository's [`RetryPolicy`].
    pub async fn get_own(&self, id: &str) -> RepoResult<E> {
        let item = self
            .retry
            .run(|| self.find_own(id), RepoError::is_not_found)
            .await?;
        Ok(entity::from_item(item)?)
    }

    async fn find_own(&self, id: &str) -> RepoResult<Item> {
        if E::KIND.parent().is_none() {
            let key = E::KIND.encode(None, id)?;
            return self
                .store
                .get(&key)
                .await?
                .ok_or_else(|| RepoError::not_found(E::KIND, id));
        }

        let sk = E::KIND.sort_key(id);
        let mut rows = self.store.query_index(&sk).await?;
        match rows.len() {
            0 => Err(RepoError::not_found(E::KIND, id)),
            1 => Ok(rows.remove(0)),
            count => {
                tracing::error!(sk = %sk, count, "Sort key is not unique");
                Err(RepoError::DuplicateKey { sk, count })
            }
        }
    }

    /// Every record of this type.
    pub async fn list_all(&self) -> RepoResult<Vec<E>> {
        let rows = self.store.scan(E::KIND.sort_prefix()).await?;
        rows.into_iter()
            .map(|item| entity::from_item(item).map_err(RepoError::from))
            .collect()
    }

    /// Records under `parent_id`. The sort prefix separates a hotel's rooms
    /// from its own metadata row.
    pub async fn list_by_parent(&self, parent_id: &str) -> RepoResult<Vec<E>> {
        let parent = E::KIND.parent().ok_or(KeyError::MissingParent { kind: E::KIND })?;
        let pk = parent
            .child_partition(parent_id)
            .ok_or(KeyError::MissingParent { kind: E::KIND })?;
        let rows = self.store.query(&pk, E::KIND.sort_prefix()).await?;
        rows.into_iter()
            .map(|item| entity::from_item(item).map_err(RepoError::from))
            .collect()
    }

    /// Insert a new record with a fresh time-ordered id.
    ///
    /// For rooms and stays the parent must exist. The check and the write
    /// are not atomic.
    pub async fn create(&self, parent_id: Option<&str>, draft: E::Draft) -> RepoResult<E> {
        if let Some(parent) = E::KIND.parent() {
            let parent_id = parent_id.ok_or(KeyError::MissingParent { kind: E::KIND })?;
            self.ensure_exists(parent, parent_id).await?;
        }

        let record = E::from_draft(
            Uuid::now_v7().to_string(),
            parent_id.map(str::to_string),
            draft,
            Utc::now(),
        );
        let item = entity::to_item(&record)?;
        tracing::debug!(kind = %E::KIND, key = %item.key, "Creating record");
        self.store.put(item).await?;
        Ok(record)
    }

    async fn ensure_exists(&self, kind: EntityKind, id: &str) -> RepoResult<()> {
        if kind.parent().is_none() {
            return match self.store.get(&kind.encode(None, id)?).await? {
                Some(_) => Ok(()),
                None => Err(RepoError::not_found(kind, id)),
            };
        }

        let sk = kind.sort_key(id);
        self.retry
            .run(
                || async {
                    if self.store.query_index(&sk).await?.is_empty() {
                        Err(RepoError::not_found(kind, id))
                    } else {
                        Ok(())
                    }
                },
                RepoError::is_not_found,
            )
            .await
    }

    /// Merge `patch` into the record with id `id`.
    pub async fn update(&self, id: &str, patch: E::Patch) -> RepoResult<Updated<E>> {
        let previous = self.get_own(id).await?;
        let key = previous.key()?;
        self.update_key(&key, previous, patch).await
    }

    /// Write the fields `patch` supplies onto the row at `key`. Other
    /// attributes are left to the store, so concurrent patches to different
    /// fields both land. `previous` is the record as read before the write.
    pub async fn update_key(
        &self,
        key: &ItemKey,
        previous: E,
        patch: E::Patch,
    ) -> RepoResult<Updated<E>> {
        let changes = entity::patch_attributes::<E>(&patch, Utc::now())?;

        tracing::debug!(kind = %E::KIND, key = %key, fields = changes.len(), "Updating record");
        let stored = self
            .store
            .update(key, changes)
            .await?
            .ok_or_else(|| RepoError::not_found(E::KIND, previous.id()))?;

        Ok(Updated {
            previous,
            current: entity::from_item(stored)?,
        })
    }

    /// Delete the record with id `id` and everything below it.
    pub async fn delete(&self, id: &str) -> RepoResult<E> {
        let record = self.get_own(id).await?;
        let key = record.key()?;
        self.delete_key(&key).await?;
        Ok(record)
    }

    /// Delete the row at `key`, then cascade to its descendants.
    ///
    /// Only the caller that actually removed the row cascades, so two
    /// concurrent deletes of the same record do the work once; the other
    /// gets `NotFound`. Descendant deletes run as one unordered batch.
    pub async fn delete_key(&self, key: &ItemKey) -> RepoResult<usize> {
        let removed = self.store.delete(key).await?;
        let Some(removed) = removed else {
            let id = E::KIND
                .decode(key)
                .map(|d| d.own_id)
                .unwrap_or_else(|_| key.sk.clone());
            return Err(RepoError::not_found(E::KIND, id));
        };

        let own_id = E::KIND.decode(&removed.key)?.own_id;
        let count = self.delete_below(E::KIND, &own_id).await.inspect_err(|err| {
            tracing::warn!(key = %key, error = %err, "Cascade delete incomplete");
        })?;

        tracing::debug!(kind = %E::KIND, key = %key, cascaded = count, "Deleted record");
        Ok(count)
    }

    /// Delete every record of this type under `parent_id`, and their
    /// descendants. Hotels have no parent and always get `MissingParent`.
    pub async fn delete_all_by_parent(&self, parent_id: &str) -> RepoResult<usize> {
        let parent = E::KIND.parent().ok_or(KeyError::MissingParent { kind: E::KIND })?;
        self.delete_below(parent, parent_id).await
    }

    /// Delete every row below `(kind, id)` as one unordered batch.
    async fn delete_below(&self, kind: EntityKind, id: &str) -> RepoResult<usize> {
        let keys = self.descendants(kind, id).await?;
        let results = join_all(keys.iter().map(|k| self.store.delete(k))).await;
        if let Some(err) = results.into_iter().find_map(Result::err) {
            return Err(err.into());
        }
        Ok(keys.len())
    }

    /// Keys of every row below `(kind, id)`.
    async fn descendants(&self, kind: EntityKind, id: &str) -> RepoResult<Vec<ItemKey>> {
        let mut out = Vec::new();
        let mut frontier = vec![(kind, id.to_string())];

        while let Some((kind, id)) = frontier.pop() {
            let (Some(child), Some(pk)) = (kind.child(), kind.child_partition(&id)) else {
                continue;
            };
            for item in self.store.query(&pk, child.sort_prefix()).await? {
                let decoded = child.decode(&item.key)?;
                frontier.push((child, decoded.own_id));
                out.push(item.key);
            }
        }
        Ok(out)
    }
}

/// One repository per entity over the same store.
#[derive(Clone)]
pub struct Repositories {
    pub hotels: HotelRepository,
    pub rooms: RoomRepository,
    pub stays: StayRepository,
}

impl Repositories {
    pub fn new(store: Arc<dyn KvStore>, retry: RetryPolicy) -> Self {
        Self {
            hotels: EntityRepository::new(store.clone()).with_retry(retry),
            rooms: EntityRepository::new(store.clone()).with_retry(retry),
            stays: EntityRepository::new(store).with_retry(retry),
        }
    }

    /// Owning hotel of a room.
    pub async fn hotel_of_room(&self, room_id: &str) -> RepoResult<Hotel> {
        let room = self.rooms.get_own(room_id).await?;
        self.hotels.get_own(&room.hotel_id).await
    }

    /// Stay, its room and the room's hotel.
    pub async fn stay_chain(&self, stay_id: &str) -> RepoResult<(Hotel, Room, Stay)> {
        let stay = self.stays.get_own(stay_id).await?;
        let room = self.rooms.get_own(&stay.room_id).await?;
        let hotel = self.hotels.get_own(&room.hotel_id).await?;
        Ok((hotel, room, stay))
    }
}
