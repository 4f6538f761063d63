//! Cache store layer for fetched Joystick content.
//!
//! The fetcher only needs `get`, `set` with a TTL and `clear`, expressed by
//! the [`CacheStore`] trait. [`MemoryCacheStore`] is the default bounded
//! in-process implementation; any other backend can be plugged in through
//! the trait.
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryCacheStore::new(MemoryCacheConfig::default());
//! store.set(&key, json!({"id": {"k": "v"}}), Duration::from_secs(300)).await?;
//! let cached = store.get(&key).await?;
//! ```

pub mod memory;
pub mod traits;

pub use memory::{MemoryCacheConfig, MemoryCacheStore};
pub use traits::{CacheStats, CacheStore};
