//! Joystick Client - fetch, cache and publish remote content
//!
//! [`Client`] reads many content items in one request through the combine
//! endpoint, memoizes shaped responses in a [`CacheStore`], and publishes
//! content updates through the config endpoint. Both the HTTP transport
//! ([`HttpSender`]) and the cache store can be replaced.
//!
//! ```ignore
//! let config = ClientConfig::builder("api-key").user_id("user-1").build()?;
//! let client = Client::new(config)?;
//! let contents = client
//!     .get_contents(&["content-1", "content-2"], &ContentOptions::new())
//!     .await?;
//! ```

mod client;
mod executor;
mod fetcher;
mod publisher;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use fetcher::MultipleContentFetcher;
pub use publisher::SingleContentPublisher;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpSender, ReqwestSender};

pub use joystick_cache::{CacheStats, CacheStore, MemoryCacheConfig, MemoryCacheStore};
pub use joystick_core::{
    ApiError, CacheError, ClientConfig, ClientConfigBuilder, ClientSettings, ConfigError,
    ContentOptions, ContentUpdate, Endpoints, JoystickError, JoystickResult, TransportError,
    ValidationError,
};
