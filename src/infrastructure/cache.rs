// Query cache - LRU of fetched list/detail views with stale marking

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Cached value with its fetch time and stale flag
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub stale: bool,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            stale: false,
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

pub struct QueryCache<V> {
    inner: LruCache<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        QueryCache {
            inner: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            ttl,
        }
    }

    /// Value for `key` if present, not marked stale and within the TTL
    pub fn get_fresh(&mut self, key: &str) -> Option<V> {
        let ttl = self.ttl;
        match self.inner.get(key) {
            Some(entry) if !entry.stale && !entry.is_expired(ttl) => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.inner.put(key.into(), CacheEntry::new(value));
    }

    /// `Some(true)` when the entry exists but must be refetched
    pub fn is_stale(&self, key: &str) -> Option<bool> {
        self.inner
            .peek(key)
            .map(|entry| entry.stale || entry.is_expired(self.ttl))
    }

    /// Mark every entry whose key starts with `prefix` as stale, returns how many were marked
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let mut marked = 0;
        for (key, entry) in self.inner.iter_mut() {
            if key.starts_with(prefix) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.inner.pop(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
