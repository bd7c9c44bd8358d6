use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::time::Instant;

use crate::keys::ItemKey;
use crate::kv::{Item, KvStore, StoreError, StoreResult};

struct Row {
    attrs: Map<String, Value>,
    /// When the row becomes visible on the `sk` index.
    indexed_at: Instant,
}

/// In-memory store for tests and local development.
///
/// Rows live in a `BTreeMap` keyed by `(pk, sk)`, so partition queries come
/// back ordered by `sk`. `with_index_lag` delays index visibility of new rows.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<BTreeMap<(String, String), Row>>>,
    index_lag: Option<Duration>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_lag(lag: Duration) -> Self {
        Self {
            index_lag: Some(lag),
            ..Self::default()
        }
    }

    /// Make every call fail with `StoreError::Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Every key currently stored, in `(pk, sk)` order.
    pub fn keys(&self) -> Vec<ItemKey> {
        self.rows
            .read()
            .keys()
            .map(|(pk, sk)| ItemKey::new(pk.clone(), sk.clone()))
            .collect()
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }

    fn to_item(pk: &str, sk: &str, row: &Row) -> Item {
        Item::new(ItemKey::new(pk, sk), row.attrs.clone())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>> {
        self.check()?;
        let rows = self.rows.read();
        Ok(rows
            .get(&(key.pk.clone(), key.sk.clone()))
            .map(|row| Self::to_item(&key.pk, &key.sk, row)))
    }

    async fn query(&self, pk: &str, sk_prefix: &str) -> StoreResult<Vec<Item>> {
        self.check()?;
        let rows = self.rows.read();
        let start = (pk.to_string(), sk_prefix.to_string());
        Ok(rows
            .range(start..)
            .take_while(|((p, s), _)| p == pk && s.starts_with(sk_prefix))
            .map(|((p, s), row)| Self::to_item(p, s, row))
            .collect())
    }

    async fn query_index(&self, sk: &str) -> StoreResult<Vec<Item>> {
        self.check()?;
        let now = Instant::now();
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|((_, s), row)| s == sk && row.indexed_at <= now)
            .map(|((p, s), row)| Self::to_item(p, s, row))
            .collect())
    }

    async fn scan(&self, sk_prefix: &str) -> StoreResult<Vec<Item>> {
        self.check()?;
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|((_, s), _)| s.starts_with(sk_prefix))
            .map(|((p, s), row)| Self::to_item(p, s, row))
            .collect())
    }

    async fn put(&self, item: Item) -> StoreResult<()> {
        self.check()?;
        let indexed_at = match self.index_lag {
            Some(lag) => Instant::now() + lag,
            None => Instant::now(),
        };
        let mut rows = self.rows.write();
        rows.insert(
            (item.key.pk, item.key.sk),
            Row {
                attrs: item.attrs,
                indexed_at,
            },
        );
        Ok(())
    }

    async fn update(&self, key: &ItemKey, changes: Map<String, Value>) -> StoreResult<Option<Item>> {
        self.check()?;
        let mut rows = self.rows.write();
        let Some(row) = rows.get_mut(&(key.pk.clone(), key.sk.clone())) else {
            return Ok(None);
        };
        for (field, value) in changes {
            row.attrs.insert(field, value);
        }
        Ok(Some(Self::to_item(&key.pk, &key.sk, row)))
    }

    async fn delete(&self, key: &ItemKey) -> StoreResult<Option<Item>> {
        self.check()?;
        let mut rows = self.rows.write();
        Ok(rows
            .remove(&(key.pk.clone(), key.sk.clone()))
            .map(|row| Item::new(key.clone(), row.attrs)))
    }
}
