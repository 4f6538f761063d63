//! Bounded in-memory cache store.
//!
//! Entries expire after their TTL. When the store is full, expired entries
//! are purged first and then the oldest insertion is evicted. Rewriting a
//! key counts as a fresh insertion. A TTL too large to represent as a
//! deadline never expires.

use crate::traits::{CacheStats, CacheStore};
use async_trait::async_trait;
use joystick_core::{CacheKey, JoystickResult, MAX_ITEMS_IN_CACHE};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Configuration for the in-memory store.
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of live entries.
    pub max_entries: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_ITEMS_IN_CACHE,
        }
    }
}

impl MemoryCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the max entries.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |deadline| deadline <= now)
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    /// Insertion order, oldest first. Always holds exactly the keys of `entries`.
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Inner {
    fn remove(&mut self, key: &CacheKey) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant) {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.remove(&key);
        }
    }

    fn make_room(&mut self, max_entries: usize, now: Instant) {
        if self.entries.len() < max_entries {
            return;
        }
        self.purge_expired(now);
        while self.entries.len() >= max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
            debug!(key = %oldest, "evicted oldest cache entry");
        }
    }
}

/// In-process [`CacheStore`] used when no other store is supplied.
#[derive(Debug)]
pub struct MemoryCacheStore {
    config: MemoryCacheConfig,
    inner: Mutex<Inner>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(MemoryCacheConfig::default())
    }
}

impl MemoryCacheStore {
    pub fn new(config: MemoryCacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &MemoryCacheConfig {
        &self.config
    }

    /// Number of entries currently held, expired ones not yet purged included.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> JoystickResult<Option<Value>> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();

        let expired = inner
            .entries
            .get(key)
            .map_or(false, |entry| entry.is_expired(now));
        if expired {
            inner.remove(key);
            debug!(key = %key, "cache entry expired");
        }

        let live = inner.entries.get(key).map(|entry| entry.value.clone());

        if live.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        Ok(live)
    }

    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) -> JoystickResult<()> {
        let mut inner = self.inner.lock().await;
        inner.remove(key);

        if ttl.is_zero() || self.config.max_entries == 0 {
            return Ok(());
        }

        let now = Instant::now();
        inner.make_room(self.config.max_entries, now);
        inner.entries.insert(
            key.clone(),
            Entry {
                value,
                expires_at: now.checked_add(ttl),
            },
        );
        inner.order.push_back(key.clone());
        Ok(())
    }

    async fn clear(&self) -> JoystickResult<bool> {
        let mut inner = self.inner.lock().await;
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.order.clear();
        debug!(dropped, "cleared in-memory cache");
        Ok(true)
    }

    async fn stats(&self) -> JoystickResult<CacheStats> {
        let inner = self.inner.lock().await;
        Ok(CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entry_count: inner.entries.len() as u64,
            evictions: inner.evictions,
        })
    }
}
