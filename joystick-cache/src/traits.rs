//! Cache store trait and usage statistics.

use async_trait::async_trait;
use joystick_core::{CacheKey, JoystickResult};
use serde_json::Value;
use std::time::Duration;

/// Key-value store with per-entry TTL.
///
/// Implementations must be safe to share between concurrent calls. Errors
/// are returned to the caller of the fetch unchanged.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live value, or `None` when absent or expired.
    async fn get(&self, key: &CacheKey) -> JoystickResult<Option<Value>>;

    /// Store a value for `ttl`. A zero TTL stores nothing.
    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) -> JoystickResult<()>;

    /// Drop every entry. Returns whether the store was cleared.
    async fn clear(&self) -> JoystickResult<bool>;

    /// Get cache statistics.
    async fn stats(&self) -> JoystickResult<CacheStats> {
        Ok(CacheStats::default())
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses, expired entries included.
    pub misses: u64,
    /// Number of entries currently held.
    pub entry_count: u64,
    /// Number of entries dropped to stay within capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
