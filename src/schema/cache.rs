//! Metadata cache boundary.
//!
//! The schema only needs "get an item, maybe fill it, save it". Values are
//! stored as JSON so any key-value backend can hold them. Entries never expire
//! from this side; invalidation belongs to the backend owner.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::RwLock;

/// A cache slot returned by [`MetadataCache::get_item`]
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem {
    key: String,
    value: Option<JsonValue>,
    hit: bool,
}

impl CacheItem {
    /// A slot with no cached value.
    pub fn miss(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            hit: false,
        }
    }

    pub fn hit(key: impl Into<String>, value: JsonValue) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            hit: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub fn get(&self) -> Option<&JsonValue> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: JsonValue) -> &mut Self {
        self.value = Some(value);
        self
    }

    pub fn into_value(self) -> Option<JsonValue> {
        self.value
    }
}

/// Key-value store holding schema metadata
pub trait MetadataCache: Send + Sync {
    fn get_item(&self, key: &str) -> CacheItem;

    /// Persist the item's value. Returns `false` when nothing was stored.
    fn save(&self, item: CacheItem) -> bool;

    fn delete_item(&self, key: &str) -> bool;

    fn clear(&self);
}

/// In-process cache backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(key)
    }
}

impl MetadataCache for MemoryCache {
    fn get_item(&self, key: &str) -> CacheItem {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        match entries.get(key) {
            Some(value) => CacheItem::hit(key, value.clone()),
            None => CacheItem::miss(key),
        }
    }

    fn save(&self, item: CacheItem) -> bool {
        let CacheItem { key, value, .. } = item;
        let Some(value) = value else {
            return false;
        };
        // Concurrent fills of the same key are tolerated: last write wins
        self.entries
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key, value);
        true
    }

    fn delete_item(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(key)
            .is_some()
    }

    fn clear(&self) {
        self.entries.write().unwrap_or_else(|p| p.into_inner()).clear();
    }
}
