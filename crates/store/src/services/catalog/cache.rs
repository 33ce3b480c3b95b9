//! TTL cache for catalog query results.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use vitrine_core::Category;

use super::QueryResult;
use crate::clock::Clock;
use crate::config::{CacheConfig, SortKey};
use crate::models::product::Product;

/// Cache key: one variant per cacheable computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full active-product set.
    AllActive,
    /// A resolved query, keyed by its normalized parameters.
    Query {
        search: Option<String>,
        category: Option<Category>,
        sort: Option<SortKey>,
        page: u32,
        page_size: u32,
    },
}

/// Cached payloads.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Result(QueryResult),
}

struct Entry {
    value: CacheValue,
    stored_at: DateTime<Utc>,
}

/// Bounded TTL cache.
///
/// Entries expire lazily: an expired entry is dropped when read or when
/// the cache needs room. When full, expired entries go first, then the
/// oldest live entry.
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl QueryCache {
    /// Create a cache with the given limits.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            config,
        }
    }

    /// The cached value for `key`, if present and fresh.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let now = self.clock.now();
        let mut entries = self.write_guard();

        match entries.get(key) {
            Some(entry) if now - entry.stored_at < self.config.ttl() => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, evicting as needed.
    pub fn insert(&self, key: CacheKey, value: CacheValue) {
        let now = self.clock.now();
        let mut entries = self.write_guard();

        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            entries.retain(|_, entry| now - entry.stored_at < self.config.ttl());

            if entries.len() >= self.config.max_entries
                && let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.write_guard().clear();
    }

    /// Number of entries, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<CacheKey, Entry>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
