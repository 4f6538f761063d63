//! Deterministic cache identity.
//!
//! A key is the lowercase hex SHA-256 of the compact JSON encoding of
//! `[api_key, params, sem_ver, user_id, ...additional]`. Params are held in
//! a `BTreeMap`, so they always encode in key order and two configs with the
//! same params inserted in a different order hash identically.

use crate::config::ClientConfig;
use crate::error::CacheError;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// A derived cache key.
///
/// Can only be produced by [`CacheKeyBuilder::build`] (or restored from a
/// string previously obtained from one).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Private inner data - cannot be constructed externally
    inner: String,
}

impl CacheKey {
    /// Wrap an existing 64-char lowercase hex digest.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == 64
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self {
            inner: hex.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

/// Derives cache keys from account-level configuration plus call-level
/// segments.
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    base_segments: [Value; 4],
}

impl CacheKeyBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        let params = match config.params() {
            Some(params) => Value::Object(params.clone().into_iter().collect()),
            None => Value::Null,
        };
        Self {
            base_segments: [
                Value::from(config.api_key()),
                params,
                config.sem_ver().map_or(Value::Null, |v| Value::from(v.as_str())),
                config.user_id().map_or(Value::Null, Value::from),
            ],
        }
    }

    pub fn build(&self, additional_segments: &[Value]) -> Result<CacheKey, CacheError> {
        let segments: Vec<&Value> = self
            .base_segments
            .iter()
            .chain(additional_segments.iter())
            .collect();

        let encoded = serde_json::to_vec(&segments).map_err(|e| CacheError::KeyDerivation {
            reason: e.to_string(),
        })?;
        if encoded.is_empty() {
            return Err(CacheError::KeyDerivation {
                reason: "key segments encoded to an empty string".to_string(),
            });
        }

        let digest = Sha256::digest(&encoded);
        Ok(CacheKey {
            inner: hex::encode(digest),
        })
    }
}
