//! Settings loading from TOML files and the environment.
//!
//! Settings are a plain document. They are turned into a [`ClientConfig`]
//! through the builder, so the same set-time validation applies.

use crate::config::{ClientConfig, ClientConfigBuilder, Endpoints, Params};
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

pub const ENV_API_KEY: &str = "JOYSTICK_API_KEY";
pub const ENV_USER_ID: &str = "JOYSTICK_USER_ID";
pub const ENV_SEM_VER: &str = "JOYSTICK_SEM_VER";
pub const ENV_SERIALIZED: &str = "JOYSTICK_SERIALIZED";
pub const ENV_CACHE_EXPIRATION_SECONDS: &str = "JOYSTICK_CACHE_EXPIRATION_SECONDS";
pub const ENV_PARAMS: &str = "JOYSTICK_PARAMS";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSettings {
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub sem_ver: Option<String>,
    pub serialized: Option<bool>,
    pub cache_expiration_seconds: Option<i64>,
    pub params: Option<Params>,
    pub endpoints: Option<EndpointSettings>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSettings {
    pub combine_url: Option<String>,
    pub config_url: Option<String>,
}

impl ClientSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Read settings from `JOYSTICK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let serialized = lookup(ENV_SERIALIZED)
            .map(|raw| parse_env_bool(ENV_SERIALIZED, &raw))
            .transpose()?;

        let cache_expiration_seconds = lookup(ENV_CACHE_EXPIRATION_SECONDS)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        field: ENV_CACHE_EXPIRATION_SECONDS.to_string(),
                        value: raw.clone(),
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let params = lookup(ENV_PARAMS)
            .map(|raw| {
                serde_json::from_str::<Params>(&raw).map_err(|e| ConfigError::InvalidValue {
                    field: ENV_PARAMS.to_string(),
                    value: raw.clone(),
                    reason: format!("must be a JSON object: {}", e),
                })
            })
            .transpose()?;

        Ok(Self {
            api_key: lookup(ENV_API_KEY),
            user_id: lookup(ENV_USER_ID),
            sem_ver: lookup(ENV_SEM_VER),
            serialized,
            cache_expiration_seconds,
            params,
            endpoints: None,
        })
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ClientSettings) -> ClientSettings {
        ClientSettings {
            api_key: other.api_key.or(self.api_key),
            user_id: other.user_id.or(self.user_id),
            sem_ver: other.sem_ver.or(self.sem_ver),
            serialized: other.serialized.or(self.serialized),
            cache_expiration_seconds: other
                .cache_expiration_seconds
                .or(self.cache_expiration_seconds),
            params: other.params.or(self.params),
            endpoints: other.endpoints.or(self.endpoints),
        }
    }

    pub fn into_builder(self) -> ClientConfigBuilder {
        let mut builder = ClientConfigBuilder::default();
        if let Some(api_key) = self.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(user_id) = self.user_id {
            builder = builder.user_id(user_id);
        }
        if let Some(sem_ver) = self.sem_ver {
            builder = builder.sem_ver(&sem_ver);
        }
        if let Some(serialized) = self.serialized {
            builder = builder.serialized(serialized);
        }
        if let Some(seconds) = self.cache_expiration_seconds {
            builder = builder.cache_expiration_seconds(seconds);
        }
        if let Some(params) = self.params {
            builder = builder.params(params);
        }
        if let Some(endpoints) = self.endpoints {
            let defaults = Endpoints::default();
            builder = builder.endpoints(Endpoints {
                combine_url: endpoints.combine_url.unwrap_or(defaults.combine_url),
                config_url: endpoints.config_url.unwrap_or(defaults.config_url),
            });
        }
        builder
    }

    pub fn into_config(self) -> Result<ClientConfig, ConfigError> {
        self.into_builder().build()
    }
}

fn parse_env_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "must be true/false or 1/0".to_string(),
        }),
    }
}
