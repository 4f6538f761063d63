//! Per-call request options and their resolution against configuration.

use crate::config::ClientConfig;
use crate::error::{ValidationError, Violation};
use crate::validate::{check_bool_flags, json_type_name, Violations};
use serde_json::Value;

const FLAG_NAMES: [&str; 3] = ["refresh", "serialized", "fullResponse"];

/// Options for a multiple-content fetch. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentOptions {
    /// Skip the cache read. The cache is written either way.
    pub refresh: Option<bool>,
    /// Override the configured response format for this call.
    pub serialized: Option<bool>,
    /// Return the raw `{data, hash, meta}` envelope instead of `data`.
    pub full_response: Option<bool>,
}

impl ContentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn serialized(mut self, serialized: bool) -> Self {
        self.serialized = Some(serialized);
        self
    }

    pub fn full_response(mut self, full_response: bool) -> Self {
        self.full_response = Some(full_response);
        self
    }

    /// Resolve against configuration defaults.
    ///
    /// Only `serialized` has a configuration-level default.
    pub fn resolve(&self, config: &ClientConfig) -> ResolvedOptions {
        ResolvedOptions {
            refresh: self.refresh,
            serialized: self.serialized.unwrap_or_else(|| config.serialized()),
            full_response: self.full_response,
        }
    }

    /// Read a loosely-typed option bag, recording problems in `violations`
    /// instead of failing. The returned options are only meaningful when no
    /// violation was added.
    pub fn collect(value: &Value, violations: &mut Violations) -> Self {
        let map = match value {
            Value::Null => return Self::default(),
            Value::Object(map) => map,
            other => {
                violations.push(Violation::new(
                    "options",
                    format!("must be an object, got {}", json_type_name(other)),
                ));
                return Self::default();
            }
        };

        check_bool_flags(map, &FLAG_NAMES, violations);
        let flag = |name: &str| map.get(name).and_then(Value::as_bool);
        Self {
            refresh: flag("refresh"),
            serialized: flag("serialized"),
            full_response: flag("fullResponse"),
        }
    }
}

/// Parse a loosely-typed option bag such as `{"serialized": true}`.
///
/// Values must be genuine booleans; `null` counts as absent and unknown keys
/// are ignored. All violations are reported together.
impl TryFrom<&Value> for ContentOptions {
    type Error = ValidationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let mut violations = Violations::new();
        let options = Self::collect(value, &mut violations);
        violations.into_result()?;
        Ok(options)
    }
}

/// Options after defaulting, fixed for the rest of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub refresh: Option<bool>,
    pub serialized: bool,
    pub full_response: Option<bool>,
}

impl ResolvedOptions {
    pub fn bypasses_cache(&self) -> bool {
        self.refresh.unwrap_or(false)
    }

    pub fn wants_full_response(&self) -> bool {
        self.full_response.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(serialized: bool) -> ClientConfig {
        ClientConfig::builder("key")
            .serialized(serialized)
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_uses_config_default_for_serialized_only() {
        let resolved = ContentOptions::new().resolve(&config(true));
        assert_eq!(
            resolved,
            ResolvedOptions {
                refresh: None,
                serialized: true,
                full_response: None,
            }
        );
        assert!(!resolved.bypasses_cache());
        assert!(!resolved.wants_full_response());
    }

    #[test]
    fn test_resolve_call_value_overrides_config() {
        let resolved = ContentOptions::new()
            .serialized(false)
            .refresh(true)
            .full_response(true)
            .resolve(&config(true));
        assert!(!resolved.serialized);
        assert!(resolved.bypasses_cache());
        assert!(resolved.wants_full_response());
    }

    #[test]
    fn test_try_from_accepts_booleans() {
        for value in [json!({"serialized": true}), json!({"serialized": false})] {
            assert!(ContentOptions::try_from(&value).is_ok());
        }
        let parsed = ContentOptions::try_from(&json!({
            "refresh": true,
            "fullResponse": false,
            "unrelated": "ignored"
        }))
        .unwrap();
        assert_eq!(parsed, ContentOptions::new().refresh(true).full_response(false));
    }

    #[test]
    fn test_try_from_rejects_boolean_like_values() {
        for bad in [json!(1), json!("true"), json!([]), json!({}), json!(0), json!("")] {
            let err = ContentOptions::try_from(&json!({ "serialized": bad })).unwrap_err();
            assert!(matches!(err, ValidationError::Rejected { .. }), "{:?}", bad);
        }
    }

    #[test]
    fn test_try_from_reports_all_flags() {
        let err = ContentOptions::try_from(&json!({
            "refresh": 1,
            "serialized": "false",
            "fullResponse": {}
        }))
        .unwrap_err();
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn test_try_from_null_and_non_object() {
        assert_eq!(ContentOptions::try_from(&Value::Null).unwrap(), ContentOptions::default());
        assert!(ContentOptions::try_from(&json!([true])).is_err());
    }

    #[test]
    fn test_collect_appends_to_existing_violations() {
        let mut violations = Violations::new();
        violations.check(false, "contentIds", "must not be empty");
        ContentOptions::collect(&json!({"refresh": 1, "serialized": true}), &mut violations);
        assert_eq!(violations.len(), 2);

        let mut clean = Violations::new();
        let options = ContentOptions::collect(&json!({"serialized": true}), &mut clean);
        assert!(clean.is_empty());
        assert_eq!(options, ContentOptions::new().serialized(true));
    }
}
