//! Content update payloads for the single-content write endpoint.

use crate::error::{ValidationError, Violation};
use crate::validate::{ensure_json_encodable, json_type_name};
use serde::Serialize;
use serde_json::Value;

pub const CONTENT_FIELD: &str = "Field `content`";
pub const DYNAMIC_CONTENT_MAP_FIELD: &str = "Field `dynamicContentMap`";

/// A content update, already encoded to JSON.
///
/// Field rules that depend on the call (content id, description length) are
/// checked by the publisher; encodability is checked here, on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUpdate {
    description: String,
    content: Value,
    dynamic_content_map: Value,
}

/// Wire body for the write endpoint.
#[derive(Debug, Serialize)]
pub struct ContentUpdateBody<'a> {
    #[serde(rename = "d")]
    pub description: &'a str,
    #[serde(rename = "c")]
    pub content: &'a Value,
    #[serde(rename = "m")]
    pub dynamic_content_map: &'a Value,
}

impl ContentUpdate {
    pub fn new<C: Serialize + ?Sized>(
        description: impl Into<String>,
        content: &C,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            description: description.into(),
            content: ensure_json_encodable(content, CONTENT_FIELD)?,
            dynamic_content_map: Value::Array(Vec::new()),
        })
    }

    /// Attach a dynamic content map. It must encode to an array or object.
    pub fn with_dynamic_content_map<M: Serialize + ?Sized>(
        mut self,
        map: &M,
    ) -> Result<Self, ValidationError> {
        let encoded = ensure_json_encodable(map, DYNAMIC_CONTENT_MAP_FIELD)?;
        check_map_shape(&encoded)?;
        self.dynamic_content_map = encoded;
        Ok(self)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn dynamic_content_map(&self) -> &Value {
        &self.dynamic_content_map
    }

    pub fn body(&self) -> ContentUpdateBody<'_> {
        ContentUpdateBody {
            description: &self.description,
            content: &self.content,
            dynamic_content_map: &self.dynamic_content_map,
        }
    }
}

fn check_map_shape(value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Array(_) | Value::Object(_) => Ok(()),
        other => Err(ValidationError::Rejected {
            violations: vec![Violation::new(
                "dynamicContentMap",
                format!("must be an array, got {}", json_type_name(other)),
            )],
        }),
    }
}

/// Parse a loosely-typed `{description, content, dynamicContentMap?}` bag.
///
/// `description` and `content` must both be present before any type check
/// runs.
impl TryFrom<&Value> for ContentUpdate {
    type Error = ValidationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let map = value.as_object().ok_or_else(|| ValidationError::Rejected {
            violations: vec![Violation::new(
                "params",
                format!("must be an object, got {}", json_type_name(value)),
            )],
        })?;

        for required in ["description", "content"] {
            if map.get(required).map_or(true, Value::is_null) {
                return Err(ValidationError::RequiredFieldMissing {
                    field: required.to_string(),
                });
            }
        }

        let description = match map.get("description") {
            Some(Value::String(s)) => s.clone(),
            other => {
                return Err(ValidationError::Rejected {
                    violations: vec![Violation::new(
                        "description",
                        format!(
                            "must be a string, got {}",
                            json_type_name(other.unwrap_or(&Value::Null))
                        ),
                    )],
                })
            }
        };

        let update = Self::new(description, &map["content"])?;
        match map.get("dynamicContentMap") {
            None | Some(Value::Null) => Ok(update),
            Some(m) => update.with_dynamic_content_map(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_new_defaults_map_to_empty_array() {
        let update = ContentUpdate::new("desc", &json!({"k": "v"})).unwrap();
        assert_eq!(update.dynamic_content_map(), &json!([]));
        assert_eq!(
            serde_json::to_value(update.body()).unwrap(),
            json!({"d": "desc", "c": {"k": "v"}, "m": []})
        );
    }

    #[test]
    fn test_dynamic_content_map_shape() {
        let update = ContentUpdate::new("desc", &json!({}))
            .unwrap()
            .with_dynamic_content_map(&json!([{"$name": "x"}]))
            .unwrap();
        assert_eq!(update.dynamic_content_map(), &json!([{"$name": "x"}]));

        let err = ContentUpdate::new("desc", &json!({}))
            .unwrap()
            .with_dynamic_content_map(&"not-a-map")
            .unwrap_err();
        assert!(matches!(err, ValidationError::Rejected { .. }));
    }

    #[test]
    fn test_unencodable_content() {
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let err = ContentUpdate::new("desc", &bad).unwrap_err();
        assert!(matches!(err, ValidationError::NotJsonEncodable { ref field, .. } if field == CONTENT_FIELD));

        let err = ContentUpdate::new("desc", &json!({}))
            .unwrap()
            .with_dynamic_content_map(&bad)
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotJsonEncodable { ref field, .. } if field == DYNAMIC_CONTENT_MAP_FIELD));
    }

    #[test]
    fn test_try_from_requires_keys_first() {
        let err = ContentUpdate::try_from(&json!({"content": {}})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RequiredFieldMissing {
                field: "description".to_string()
            }
        );

        // Presence is reported before the description's type.
        let err = ContentUpdate::try_from(&json!({"description": 5})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RequiredFieldMissing {
                field: "content".to_string()
            }
        );
    }

    #[test]
    fn test_try_from_type_checks() {
        let err = ContentUpdate::try_from(&json!({"description": 5, "content": {}})).unwrap_err();
        assert!(matches!(err, ValidationError::Rejected { .. }));

        let update = ContentUpdate::try_from(&json!({
            "description": "ok",
            "content": [1, 2],
            "dynamicContentMap": {"segment": "a"}
        }))
        .unwrap();
        assert_eq!(update.description(), "ok");
        assert_eq!(update.content(), &json!([1, 2]));
    }
}
