//! Joystick Core - configuration, cache identity, validation, errors
//!
//! Pure data and deterministic logic shared by the cache and client crates.
//! Nothing in here performs I/O apart from reading settings files.

pub mod cache_key;
pub mod config;
pub mod envelope;
pub mod error;
pub mod options;
pub mod settings;
pub mod update;
pub mod validate;

pub use cache_key::{CacheKey, CacheKeyBuilder};
pub use config::{
    ClientConfig, ClientConfigBuilder, Endpoints, Params, SemVer, DEFAULT_CACHE_EXPIRATION_SECONDS,
    DEFAULT_COMBINE_URL, DEFAULT_CONFIG_URL, MAX_ITEMS_IN_CACHE,
};
pub use envelope::{CombineResponse, ContentEntry, ContentEnvelope};
pub use error::{
    ApiError, CacheError, ConfigError, JoystickError, JoystickResult, TransportError,
    ValidationError, Violation,
};
pub use options::{ContentOptions, ResolvedOptions};
pub use settings::ClientSettings;
pub use update::{ContentUpdate, ContentUpdateBody};
pub use validate::{ensure_json_encodable, Violations, MAX_DESCRIPTION_CHARS};
