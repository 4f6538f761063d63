//! Client facade.

use crate::executor::RequestExecutor;
use crate::fetcher::MultipleContentFetcher;
use crate::publisher::SingleContentPublisher;
use crate::transport::{HttpSender, ReqwestSender};
use joystick_cache::{CacheStats, CacheStore, MemoryCacheStore};
use joystick_core::{
    ApiError, ClientConfig, ClientSettings, ConfigError, ContentOptions, ContentUpdate, JoystickResult,
};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Entry point for reading and publishing Joystick content.
///
/// The configuration is captured at build time and never changes for the
/// life of the client; build a new client to change it.
///
/// Concurrent calls that derive the same cache key may both miss the cache
/// and each send a request. Identical in-flight fetches are not coalesced.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    cache: Arc<dyn CacheStore>,
    fetcher: MultipleContentFetcher,
    publisher: SingleContentPublisher,
}

impl Client {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Client with the default `reqwest` sender and in-memory cache.
    pub fn new(config: ClientConfig) -> JoystickResult<Self> {
        ClientBuilder::new(config).build()
    }

    /// Client built from a settings document or the environment.
    pub fn from_settings(settings: ClientSettings) -> JoystickResult<Self> {
        Self::new(settings.into_config()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch several content items in one request.
    ///
    /// Served from cache unless `options.refresh` is set. With
    /// `full_response` each value is the `{data, hash, meta}` envelope,
    /// otherwise only `data`.
    pub async fn get_contents<S: AsRef<str>>(
        &self,
        content_ids: &[S],
        options: &ContentOptions,
    ) -> JoystickResult<Map<String, Value>> {
        self.fetcher.get_contents(content_ids, options).await
    }

    /// Fetch with options given as a JSON object such as
    /// `{"refresh": true}`. Every id and option problem is reported in one
    /// validation error before any request is sent.
    pub async fn get_contents_with_raw_options<S: AsRef<str>>(
        &self,
        content_ids: &[S],
        options: &Value,
    ) -> JoystickResult<Map<String, Value>> {
        self.fetcher
            .get_contents_with_raw_options(content_ids, options)
            .await
    }

    /// Fetch one content item. Fails with [`ApiError::MissingContent`] when
    /// the response does not contain `content_id`.
    pub async fn get_content(
        &self,
        content_id: &str,
        options: &ContentOptions,
    ) -> JoystickResult<Value> {
        let mut contents = self.fetcher.get_contents(&[content_id], options).await?;
        contents.remove(content_id).ok_or_else(|| {
            ApiError::MissingContent {
                content_id: content_id.to_string(),
            }
            .into()
        })
    }

    pub async fn publish_content_update(
        &self,
        content_id: &str,
        update: &ContentUpdate,
    ) -> JoystickResult<()> {
        self.publisher
            .publish_content_update(content_id, update)
            .await
    }

    /// Drop every cached response. Returns the store's result.
    pub async fn clear_cache(&self) -> JoystickResult<bool> {
        self.cache.clear().await
    }

    pub async fn cache_stats(&self) -> JoystickResult<CacheStats> {
        self.cache.stats().await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`] with injectable transport and cache.
pub struct ClientBuilder {
    config: ClientConfig,
    sender: Option<Arc<dyn HttpSender>>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            sender: None,
            cache: None,
        }
    }

    pub fn http_sender(mut self, sender: Arc<dyn HttpSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn cache_store(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> JoystickResult<Client> {
        if self.config.api_key().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "api_key".to_string(),
            }
            .into());
        }

        let config = Arc::new(self.config);
        let sender = self
            .sender
            .unwrap_or_else(|| Arc::new(ReqwestSender::new()) as Arc<dyn HttpSender>);
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCacheStore::default()) as Arc<dyn CacheStore>);

        let executor = RequestExecutor::new(Arc::clone(&config), sender);
        Ok(Client {
            fetcher: MultipleContentFetcher::new(executor.clone(), Arc::clone(&cache)),
            publisher: SingleContentPublisher::new(executor),
            config,
            cache,
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("custom_sender", &self.sender.is_some())
            .field("custom_cache", &self.cache.is_some())
            .finish()
    }
}
