use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::keys::ItemKey;

pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure errors from the backing store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("internal store error: {0}")]
    Internal(String),
}

/// One stored row: its key plus the non-key attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    pub attrs: Map<String, Value>,
}

impl Item {
    pub fn new(key: ItemKey, attrs: Map<String, Value>) -> Self {
        Self { key, attrs }
    }
}

/// Single-table key/value store.
///
/// Reads by primary key and by partition are strongly consistent. The
/// `sk` index (`query_index`) may lag behind writes.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Point lookup by `(pk, sk)`.
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>>;

    /// Rows of partition `pk` whose `sk` starts with `sk_prefix`, ordered by `sk`.
    async fn query(&self, pk: &str, sk_prefix: &str) -> StoreResult<Vec<Item>>;

    /// Rows whose `sk` equals `sk`, across all partitions.
    async fn query_index(&self, sk: &str) -> StoreResult<Vec<Item>>;

    /// Full scan filtered on `sk` prefix.
    async fn scan(&self, sk_prefix: &str) -> StoreResult<Vec<Item>>;

    /// Insert or replace a row.
    async fn put(&self, item: Item) -> StoreResult<()>;

    /// Merge `changes` into an existing row. `None` if the row is absent.
    async fn update(&self, key: &ItemKey, changes: Map<String, Value>) -> StoreResult<Option<Item>>;

    /// Remove a row, returning what was removed. `None` if it was absent.
    async fn delete(&self, key: &ItemKey) -> StoreResult<Option<Item>>;
}
