//! Multiple-content reads through the combine endpoint.
//!
//! Each call runs validate, derive key, read cache, request, decode, shape
//! and write cache, in that order. The cache is written even when `refresh`
//! skipped the read, so a forced refresh repopulates it.

use crate::executor::RequestExecutor;
use crate::transport::HttpMethod;
use joystick_cache::CacheStore;
use joystick_core::validate::check_content_ids;
use joystick_core::{
    CacheKey, CacheKeyBuilder, ClientConfig, ConfigError, CombineResponse, ContentOptions,
    JoystickResult, Params, ResolvedOptions, Violations,
};
use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Request body for the combine endpoint.
#[derive(Debug, Serialize)]
struct CombineBody<'a> {
    u: &'a str,
    p: ParamsBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    v: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ParamsBody<'a> {
    Params(&'a Params),
    Empty(Map<String, Value>),
}

impl<'a> CombineBody<'a> {
    fn from_config(config: &'a ClientConfig) -> Self {
        Self {
            u: config.user_id().unwrap_or(""),
            p: match config.params() {
                Some(params) => ParamsBody::Params(params),
                None => ParamsBody::Empty(Map::new()),
            },
            v: config.sem_ver().map(|v| v.as_str()),
        }
    }
}

#[derive(Clone)]
pub struct MultipleContentFetcher {
    executor: RequestExecutor,
    cache: Arc<dyn CacheStore>,
    keys: CacheKeyBuilder,
}

impl MultipleContentFetcher {
    pub(crate) fn new(executor: RequestExecutor, cache: Arc<dyn CacheStore>) -> Self {
        let keys = CacheKeyBuilder::new(executor.config());
        Self {
            executor,
            cache,
            keys,
        }
    }

    /// Fetch every id in one request, keyed by content id in the order the
    /// service returned them.
    pub async fn get_contents<S: AsRef<str>>(
        &self,
        content_ids: &[S],
        options: &ContentOptions,
    ) -> JoystickResult<Map<String, Value>> {
        let mut violations = Violations::new();
        check_content_ids(content_ids, &mut violations);
        violations.into_result()?;
        self.fetch(content_ids, options).await
    }

    /// Like [`get_contents`](Self::get_contents) with a loosely-typed option
    /// bag. Id and option violations are reported in one error.
    pub async fn get_contents_with_raw_options<S: AsRef<str>>(
        &self,
        content_ids: &[S],
        options: &Value,
    ) -> JoystickResult<Map<String, Value>> {
        let mut violations = Violations::new();
        check_content_ids(content_ids, &mut violations);
        let options = ContentOptions::collect(options, &mut violations);
        violations.into_result()?;
        self.fetch(content_ids, &options).await
    }

    async fn fetch<S: AsRef<str>>(
        &self,
        content_ids: &[S],
        options: &ContentOptions,
    ) -> JoystickResult<Map<String, Value>> {
        let ids: Vec<&str> = content_ids.iter().map(AsRef::as_ref).collect();
        let resolved = options.resolve(self.executor.config());
        let key = self.cache_key(&ids, &resolved)?;

        if !resolved.bypasses_cache() {
            if let Some(cached) = self.read_cache(&key).await? {
                return Ok(cached);
            }
        }

        let url = self.combine_url(&ids, &resolved)?;
        let body = CombineBody::from_config(self.executor.config());
        let decoded = self.executor.execute(HttpMethod::Post, url, &body).await?;

        let response = CombineResponse::from_value(decoded)?;
        let failures = response.failures();
        if !failures.is_empty() {
            warn!(failed = failures.len(), "combine response contains failed items");
        }
        let shaped = response.shape(resolved.wants_full_response())?;

        self.cache
            .set(
                &key,
                Value::Object(shaped.clone()),
                self.executor.config().cache_expiration(),
            )
            .await?;

        Ok(shaped)
    }

    fn cache_key(&self, ids: &[&str], resolved: &ResolvedOptions) -> JoystickResult<CacheKey> {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        let key = self.keys.build(&[
            Value::from(sorted),
            Value::from(resolved.serialized),
            resolved.full_response.map_or(Value::Null, Value::from),
        ])?;
        Ok(key)
    }

    async fn read_cache(&self, key: &CacheKey) -> JoystickResult<Option<Map<String, Value>>> {
        match self.cache.get(key).await? {
            Some(Value::Object(map)) if !map.is_empty() => {
                debug!(key = %key, "cache hit");
                Ok(Some(map))
            }
            Some(other) if is_truthy(&other) => {
                warn!(key = %key, "ignoring cached value that is not an object");
                Ok(None)
            }
            _ => {
                debug!(key = %key, "cache miss");
                Ok(None)
            }
        }
    }

    fn combine_url(&self, ids: &[&str], resolved: &ResolvedOptions) -> JoystickResult<Url> {
        let encoded_ids = Value::from(ids.to_vec()).to_string();
        let mut query = vec![("c", encoded_ids.as_str()), ("dynamic", "true")];
        if resolved.serialized {
            query.push(("responseType", "serialized"));
        }

        let base = &self.executor.config().endpoints().combine_url;
        let url = Url::parse_with_params(base, &query).map_err(|e| ConfigError::InvalidValue {
            field: "combine_url".to_string(),
            value: base.clone(),
            reason: e.to_string(),
        })?;
        Ok(url)
    }
}

/// Loose truthiness for cached values: `null`, `false`, `0`, `""`, `"0"`
/// and empty collections count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
