//! Combine endpoint response decoding.
//!
//! The endpoint answers with a JSON object keyed by content id. Each value
//! is either the success envelope `{data, hash, meta}` or a plain string
//! describing why that one id failed. Both shapes decode into
//! [`ContentEntry`].

use crate::error::ApiError;
use crate::validate::json_type_name;
use serde_json::{Map, Value};

/// Success envelope for one content item, kept exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEnvelope {
    raw: Map<String, Value>,
}

impl ContentEnvelope {
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// The content payload; `null` when the service omitted it.
    pub fn data(&self) -> &Value {
        self.raw.get("data").unwrap_or(&Value::Null)
    }

    pub fn hash(&self) -> Option<&str> {
        self.raw.get("hash").and_then(Value::as_str)
    }

    pub fn meta(&self) -> Option<&Value> {
        self.raw.get("meta")
    }

    pub fn into_data(mut self) -> Value {
        self.raw.remove("data").unwrap_or(Value::Null)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.raw)
    }
}

/// Per-id outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEntry {
    Success(ContentEnvelope),
    Failure { message: String },
}

impl ContentEntry {
    fn decode(content_id: &str, value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(raw) => Ok(ContentEntry::Success(ContentEnvelope::new(raw))),
            Value::String(message) => Ok(ContentEntry::Failure { message }),
            other => Err(ApiError::MalformedResponse {
                reason: format!(
                    "entry for {} must be an object or a string, got {}",
                    content_id,
                    json_type_name(&other)
                ),
            }),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ContentEntry::Failure { .. })
    }
}

/// Decoded combine response, in the order the service returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineResponse {
    entries: Vec<(String, ContentEntry)>,
}

impl CombineResponse {
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ApiError::MalformedResponse {
                    reason: format!("expected an object, got {}", json_type_name(&other)),
                })
            }
        };
        let entries = map
            .into_iter()
            .map(|(id, value)| {
                let entry = ContentEntry::decode(&id, value)?;
                Ok((id, entry))
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, ContentEntry)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failure messages, in response order.
    pub fn failures(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(_, entry)| match entry {
                ContentEntry::Failure { message } => Some(message.as_str()),
                ContentEntry::Success(_) => None,
            })
            .collect()
    }

    /// Fail with every failure message if any id failed.
    pub fn ensure_complete(&self) -> Result<(), ApiError> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ApiError::PartialContent {
                errors: failures.into_iter().map(str::to_string).collect(),
            })
        }
    }

    /// Shape into the caller-facing map: the envelope when `full_response`,
    /// otherwise only each item's `data`.
    pub fn shape(self, full_response: bool) -> Result<Map<String, Value>, ApiError> {
        self.ensure_complete()?;
        let mut shaped = Map::with_capacity(self.entries.len());
        for (id, entry) in self.entries {
            if let ContentEntry::Success(envelope) = entry {
                let value = if full_response {
                    envelope.into_value()
                } else {
                    envelope.into_data()
                };
                shaped.insert(id, value);
            }
        }
        Ok(shaped)
    }
}
