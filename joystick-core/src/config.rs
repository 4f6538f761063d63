//! Client configuration
//!
//! `ClientConfig` is an immutable snapshot. It can only be produced by
//! [`ClientConfigBuilder`], which validates every field as it is set, so a
//! built config always carries a non-empty API key and, when present, a
//! syntactically valid semantic version.

use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Cache TTL applied when none is configured.
pub const DEFAULT_CACHE_EXPIRATION_SECONDS: u64 = 300;

/// Capacity of the default in-memory cache store.
pub const MAX_ITEMS_IN_CACHE: usize = 1000;

/// Read endpoint (multiple content).
pub const DEFAULT_COMBINE_URL: &str = "https://api.getjoystick.com/api/v1/combine/";

/// Write endpoint prefix (single content); the content id is appended.
pub const DEFAULT_CONFIG_URL: &str = "https://capi.getjoystick.com/api/v1/config/";

// major.minor.patch, no leading zeros, no pre-release or build suffix
static SEM_VER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<patch>0|[1-9]\d*)$")
        .expect("semver regex is valid")
});

/// Extra parameters forwarded to the API. Always iterated in key order.
pub type Params = BTreeMap<String, Value>;

/// A validated `major.minor.patch` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SemVer(String);

impl SemVer {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        if SEM_VER_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ConfigError::InvalidValue {
                field: "sem_ver".to_string(),
                value: value.to_string(),
                reason: "must match major.minor.patch without leading zeros or suffixes"
                    .to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote endpoints. Not part of cache identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub combine_url: String,
    pub config_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            combine_url: DEFAULT_COMBINE_URL.to_string(),
            config_url: DEFAULT_CONFIG_URL.to_string(),
        }
    }
}

/// Immutable per-client configuration.
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    api_key: String,
    user_id: Option<String>,
    params: Option<Params>,
    sem_ver: Option<SemVer>,
    serialized: bool,
    cache_expiration: Duration,
    endpoints: Endpoints,
}

impl ClientConfig {
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(api_key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn sem_ver(&self) -> Option<&SemVer> {
        self.sem_ver.as_ref()
    }

    /// Default response-format preference; overridable per call.
    pub fn serialized(&self) -> bool {
        self.serialized
    }

    pub fn cache_expiration(&self) -> Duration {
        self.cache_expiration
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Start a builder pre-populated with this config's values.
    pub fn to_builder(&self) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: Some(self.api_key.clone()),
            user_id: self.user_id.clone(),
            params: self.params.clone(),
            sem_ver: self.sem_ver.clone(),
            serialized: self.serialized,
            cache_expiration: self.cache_expiration,
            endpoints: self.endpoints.clone(),
            error: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("params", &self.params)
            .field("sem_ver", &self.sem_ver)
            .field("serialized", &self.serialized)
            .field("cache_expiration", &self.cache_expiration)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
///
/// Setters never panic. The first invalid value is remembered and reported
/// by [`build`](Self::build), so a chain of setters can be written without
/// intermediate `?`.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    user_id: Option<String>,
    params: Option<Params>,
    sem_ver: Option<SemVer>,
    serialized: bool,
    cache_expiration: Duration,
    endpoints: Endpoints,
    error: Option<ConfigError>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            user_id: None,
            params: None,
            sem_ver: None,
            serialized: false,
            cache_expiration: Duration::from_secs(DEFAULT_CACHE_EXPIRATION_SECONDS),
            endpoints: Endpoints::default(),
            error: None,
        }
    }
}

impl ClientConfigBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().api_key(api_key)
    }

    fn fail(mut self, err: ConfigError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return self.fail(ConfigError::InvalidValue {
                field: "api_key".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        self.api_key = Some(api_key);
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Replace all params.
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Insert or overwrite a single param.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn sem_ver(mut self, sem_ver: &str) -> Self {
        match SemVer::parse(sem_ver) {
            Ok(parsed) => {
                self.sem_ver = Some(parsed);
                self
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn serialized(mut self, serialized: bool) -> Self {
        self.serialized = serialized;
        self
    }

    /// Set the cache TTL. Negative values are rejected.
    pub fn cache_expiration_seconds(mut self, seconds: i64) -> Self {
        match u64::try_from(seconds) {
            Ok(secs) => {
                self.cache_expiration = Duration::from_secs(secs);
                self
            }
            Err(_) => self.fail(ConfigError::InvalidValue {
                field: "cache_expiration_seconds".to_string(),
                value: seconds.to_string(),
                reason: "must be >= 0".to_string(),
            }),
        }
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let api_key = self.api_key.ok_or_else(|| ConfigError::MissingRequired {
            field: "api_key".to_string(),
        })?;
        Ok(ClientConfig {
            api_key,
            user_id: self.user_id,
            params: self.params,
            sem_ver: self.sem_ver,
            serialized: self.serialized,
            cache_expiration: self.cache_expiration,
            endpoints: self.endpoints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::builder("key").build().unwrap();
        assert_eq!(config.api_key(), "key");
        assert_eq!(config.user_id(), None);
        assert_eq!(config.params(), None);
        assert_eq!(config.sem_ver(), None);
        assert!(!config.serialized());
        assert_eq!(config.cache_expiration(), Duration::from_secs(300));
        assert_eq!(config.endpoints(), &Endpoints::default());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = ClientConfig::builder("").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "api_key"));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let err = ClientConfigBuilder::default().build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_valid_sem_vers() {
        for v in ["0.0.1", "1.2.3", "10.20.30", "0.0.0"] {
            let config = ClientConfig::builder("key").sem_ver(v).build().unwrap();
            assert_eq!(config.sem_ver().map(SemVer::as_str), Some(v));
        }
    }

    #[test]
    fn test_invalid_sem_vers() {
        for v in ["", "1", "1.2", "01.2.3", "1.02.3", "1.2.03", "1.2.3-beta", "1.2.3+build", "v1.2.3", "a.b.c"] {
            let err = ClientConfig::builder("key").sem_ver(v).build().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "sem_ver"),
                "{} should be rejected",
                v
            );
        }
    }

    #[test]
    fn test_negative_expiration_rejected() {
        let err = ClientConfig::builder("key")
            .cache_expiration_seconds(-1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "cache_expiration_seconds"));

        let config = ClientConfig::builder("key")
            .cache_expiration_seconds(0)
            .build()
            .unwrap();
        assert_eq!(config.cache_expiration(), Duration::ZERO);
    }

    #[test]
    fn test_first_error_wins() {
        let err = ClientConfig::builder("")
            .sem_ver("bad")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "api_key"));
    }

    #[test]
    fn test_param_inserts_into_params() {
        let config = ClientConfig::builder("key")
            .param("b", 2)
            .param("a", "one")
            .build()
            .unwrap();
        let params = config.params().unwrap();
        let keys: Vec<&String> = params.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(params["a"], json!("one"));
    }

    #[test]
    fn test_to_builder_does_not_alias() {
        let original = ClientConfig::builder("key").user_id("u1").build().unwrap();
        let derived = original.to_builder().user_id("u2").build().unwrap();
        assert_eq!(original.user_id(), Some("u1"));
        assert_eq!(derived.user_id(), Some("u2"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::builder("super-secret").build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
