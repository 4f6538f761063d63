//! Input validation.
//!
//! Checks are lazy: every rule is evaluated and all violations are reported
//! together, rather than stopping at the first failure.

use crate::error::{ValidationError, Violation};
use serde::Serialize;
use serde_json::{Map, Value};

/// Longest accepted content update description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 50;

/// Collector for violated rules.
#[derive(Debug, Default, Clone)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, reason: impl Into<String>) -> &mut Self {
        if !ok {
            self.violations.push(Violation::new(field, reason));
        }
        self
    }

    pub fn push(&mut self, violation: Violation) -> &mut Self {
        self.violations.push(violation);
        self
    }

    pub fn extend(&mut self, other: Violations) -> &mut Self {
        self.violations.extend(other.violations);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Rejected {
                violations: self.violations,
            })
        }
    }
}

/// A non-empty list of non-empty identifiers.
pub fn check_content_ids<S: AsRef<str>>(content_ids: &[S], violations: &mut Violations) {
    violations.check(
        !content_ids.is_empty(),
        "contentIds",
        "must contain at least 1 element",
    );
    for (index, id) in content_ids.iter().enumerate() {
        violations.check(
            !id.as_ref().is_empty(),
            format!("contentIds[{}]", index),
            "must be a non-empty string",
        );
    }
}

/// Genuine booleans only. Missing keys and `null` are accepted as absent.
pub fn check_bool_flags(options: &Map<String, Value>, flags: &[&str], violations: &mut Violations) {
    for flag in flags {
        match options.get(*flag) {
            None | Some(Value::Null) | Some(Value::Bool(_)) => {}
            Some(other) => {
                violations.push(Violation::new(
                    *flag,
                    format!("must be a boolean, got {}", json_type_name(other)),
                ));
            }
        }
    }
}

pub fn check_content_id(content_id: &str, violations: &mut Violations) {
    violations.check(!content_id.is_empty(), "Content ID", "must be a non-empty string");
}

pub fn check_description(description: &str, violations: &mut Violations) {
    let chars = description.chars().count();
    violations.check(chars >= 1, "description", "must not be empty");
    violations.check(
        chars <= MAX_DESCRIPTION_CHARS,
        "description",
        format!(
            "must be at most {} characters, got {}",
            MAX_DESCRIPTION_CHARS, chars
        ),
    );
}

/// Attempt encoding; report failures as `NotJsonEncodable` for `field`.
pub fn ensure_json_encodable<T: Serialize + ?Sized>(
    value: &T,
    field: &str,
) -> Result<Value, ValidationError> {
    serde_json::to_value(value).map_err(|e| ValidationError::NotJsonEncodable {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_empty_violations_is_ok() {
        assert!(Violations::new().into_result().is_ok());
    }

    #[test]
    fn test_content_ids_reports_every_problem() {
        let mut v = Violations::new();
        check_content_ids(&["ok", "", "also-ok", ""], &mut v);
        let err = v.into_result().unwrap_err();
        let fields: Vec<String> = err.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["contentIds[1]", "contentIds[3]"]);
    }

    #[test]
    fn test_empty_content_ids_rejected() {
        let mut v = Violations::new();
        check_content_ids::<&str>(&[], &mut v);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_bool_flags() {
        let options = json!({
            "refresh": true,
            "serialized": 1,
            "fullResponse": "true",
            "other": 42
        });
        let mut v = Violations::new();
        check_bool_flags(
            options.as_object().unwrap(),
            &["refresh", "serialized", "fullResponse"],
            &mut v,
        );
        let err = v.into_result().unwrap_err();
        let fields: Vec<String> = err.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["serialized", "fullResponse"]);
    }

    #[test]
    fn test_null_flag_is_absent() {
        let options = json!({ "refresh": null });
        let mut v = Violations::new();
        check_bool_flags(options.as_object().unwrap(), &["refresh"], &mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn test_description_bounds() {
        for (desc, ok) in [
            ("", false),
            ("a", true),
            (&"x".repeat(50)[..], true),
            (&"x".repeat(51)[..], false),
            (&"é".repeat(50)[..], true),
        ] {
            let mut v = Violations::new();
            check_description(desc, &mut v);
            assert_eq!(v.is_empty(), ok, "description of {} chars", desc.chars().count());
        }
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("recursion detected"))
        }
    }

    #[test]
    fn test_ensure_json_encodable() {
        assert_eq!(
            ensure_json_encodable(&json!({"a": [1, 2]}), "Field `content`").unwrap(),
            json!({"a": [1, 2]})
        );

        let err = ensure_json_encodable(&Unencodable, "Field `content`").unwrap_err();
        assert!(matches!(err, ValidationError::NotJsonEncodable { ref field, .. } if field == "Field `content`"));

        let mut tuple_keys = HashMap::new();
        tuple_keys.insert((1, 2), "v");
        let err = ensure_json_encodable(&tuple_keys, "Field `dynamicContentMap`").unwrap_err();
        assert!(matches!(err, ValidationError::NotJsonEncodable { .. }));
    }
}
