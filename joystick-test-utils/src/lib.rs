//! Joystick Test Utilities
//!
//! Shared test infrastructure for the Joystick workspace:
//! - Scripted HTTP senders that record every request
//! - A cache store wrapper that records writes
//! - Proptest generators for ids, params and versions
//! - Fixtures for configs and combine responses

pub use joystick_cache::{CacheStats, CacheStore, MemoryCacheStore};
pub use joystick_client::{
    ApiRequest, ApiResponse, Client, ClientBuilder, HttpMethod, HttpSender,
};
pub use joystick_core::{
    ApiError, CacheKey, ClientConfig, ContentOptions, ContentUpdate, JoystickError,
    JoystickResult, TransportError, ValidationError,
};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// Scripted reply for [`MockHttpSender`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(ApiResponse),
    /// Fail at the transport level with a connection-refused I/O error.
    TransportFailure(String),
}

/// HTTP sender that replays scripted replies in order and records requests.
///
/// Once the script runs out, every further call gets the fallback reply
/// (200 with an empty JSON object unless set otherwise).
#[derive(Debug)]
pub struct MockHttpSender {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    requests: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl Default for MockHttpSender {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHttpSender {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: MockReply::Response(ApiResponse::json(200, &Value::Object(Default::default()))),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer `status` with `body` encoded as JSON.
    pub fn always_json(status: u16, body: Value) -> Self {
        Self::new().with_fallback(MockReply::Response(ApiResponse::json(status, &body)))
    }

    /// Always answer `status` with a raw body.
    pub fn always_raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new().with_fallback(MockReply::Response(ApiResponse::new(status, body)))
    }

    /// Always fail at the transport level.
    pub fn always_failing(message: impl Into<String>) -> Self {
        Self::new().with_fallback(MockReply::TransportFailure(message.into()))
    }

    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Queue a reply ahead of the fallback.
    pub async fn push_reply(&self, reply: MockReply) {
        self.script.lock().await.push_back(reply);
    }

    pub async fn push_json(&self, status: u16, body: Value) {
        self.push_reply(MockReply::Response(ApiResponse::json(status, &body)))
            .await;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl HttpSender for MockHttpSender {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        let reply = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::TransportFailure(message) => Err(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message,
            ))),
        }
    }
}

// ============================================================================
// RECORDING CACHE
// ============================================================================

/// One `set` call seen by [`RecordingCacheStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheWrite {
    pub key: CacheKey,
    pub value: Value,
    pub ttl: Duration,
}

/// In-memory store that also records every write.
#[derive(Debug, Default)]
pub struct RecordingCacheStore {
    inner: MemoryCacheStore,
    writes: Mutex<Vec<CacheWrite>>,
}

impl RecordingCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn writes(&self) -> Vec<CacheWrite> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl CacheStore for RecordingCacheStore {
    async fn get(&self, key: &CacheKey) -> JoystickResult<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) -> JoystickResult<()> {
        self.writes.lock().await.push(CacheWrite {
            key: key.clone(),
            value: value.clone(),
            ttl,
        });
        self.inner.set(key, value, ttl).await
    }

    async fn clear(&self) -> JoystickResult<bool> {
        self.inner.clear().await
    }

    async fn stats(&self) -> JoystickResult<CacheStats> {
        self.inner.stats().await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Joystick inputs.

    use proptest::prelude::*;
    use serde_json::Value;

    /// Content ids as the service issues them.
    pub fn arb_content_id() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,23}"
    }

    pub fn arb_content_ids() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_content_id(), 1..6)
    }

    pub fn arb_sem_ver() -> impl Strategy<Value = String> {
        (0u32..100, 0u32..100, 0u32..100).prop_map(|(a, b, c)| format!("{}.{}.{}", a, b, c))
    }

    pub fn arb_param_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
        ]
    }

    /// Param pairs with unique keys, in arbitrary order.
    pub fn arb_params() -> impl Strategy<Value = Vec<(String, Value)>> {
        prop::collection::btree_map("[a-z]{1,10}", arb_param_value(), 0..6)
            .prop_map(|m| m.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    }

    /// Descriptions the publisher accepts.
    pub fn arb_valid_description() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ]{1,50}"
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built configs and combine responses.

    use super::*;
    use serde_json::{json, Map};

    pub const TEST_API_KEY: &str = "test-api-key";

    /// Config with only an API key.
    pub fn test_config() -> ClientConfig {
        config_builder().build().unwrap()
    }

    pub fn config_builder() -> joystick_core::ClientConfigBuilder {
        ClientConfig::builder(TEST_API_KEY)
    }

    /// Success envelope for one content item.
    pub fn envelope(data: Value) -> Value {
        json!({
            "data": data,
            "hash": "b3c4a1f2",
            "meta": {"uid": 0, "mod": 0, "variants": [], "seg": []}
        })
    }

    /// Combine response with a success envelope per `(id, data)` pair.
    pub fn combine_response<'a>(items: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
        let map: Map<String, Value> = items
            .into_iter()
            .map(|(id, data)| (id.to_string(), envelope(data)))
            .collect();
        Value::Object(map)
    }

    /// Client over the given sender and cache.
    pub fn client_with(
        config: ClientConfig,
        sender: Arc<MockHttpSender>,
        cache: Arc<dyn CacheStore>,
    ) -> Client {
        Client::builder(config)
            .http_sender(sender)
            .cache_store(cache)
            .build()
            .unwrap()
    }

    /// Client over a fresh mock sender and in-memory cache.
    pub fn mock_client(config: ClientConfig) -> (Client, Arc<MockHttpSender>) {
        let sender = Arc::new(MockHttpSender::new());
        let client = client_with(
            config,
            Arc::clone(&sender),
            Arc::new(MemoryCacheStore::default()),
        );
        (client, sender)
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use joystick_client::transport::Url;
    use serde_json::json;

    fn request() -> ApiRequest {
        ApiRequest::new(HttpMethod::Post, Url::parse("https://example.test/").unwrap())
    }

    #[tokio::test]
    async fn test_mock_sender_script_then_fallback() {
        let sender = MockHttpSender::always_json(500, json!({"error": "x"}));
        sender.push_json(200, json!({"ok": true})).await;

        let first = sender.send(request()).await.unwrap();
        let second = sender.send(request()).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(second.status, 500);
        assert_eq!(sender.call_count(), 2);
        assert_eq!(sender.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_sender_transport_failure() {
        let sender = MockHttpSender::always_failing("connection refused");
        let err = sender.send(request()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_combine_response_fixture() {
        let response = fixtures::combine_response([("a", json!({"k": 1}))]);
        assert_eq!(response["a"]["data"], json!({"k": 1}));
        assert!(response["a"]["hash"].is_string());
    }
}
