//! Error types for Joystick client operations

use std::fmt;
use thiserror::Error;

/// A single rule violated by caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn list_failures(errors: &[String]) -> String {
    let mut message =
        String::from("The following errors found when calling Multiple Content API:");
    for error in errors {
        message.push_str("\n-  ");
        message.push_str(error);
    }
    message
}

/// Malformed caller input. Always raised before any network call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("{} rule(s) violated: {}", .violations.len(), join_violations(.violations))]
    Rejected { violations: Vec<Violation> },

    #[error("{field} can not be encoded to JSON: {reason}")]
    NotJsonEncodable { field: String, reason: String },
}

impl ValidationError {
    /// Every violated rule carried by this error.
    pub fn violations(&self) -> Vec<Violation> {
        match self {
            ValidationError::RequiredFieldMissing { field } => {
                vec![Violation::new(field.clone(), "is required")]
            }
            ValidationError::Rejected { violations } => violations.clone(),
            ValidationError::NotJsonEncodable { field, reason } => {
                vec![Violation::new(field.clone(), reason.clone())]
            }
        }
    }
}

/// Configuration errors, raised at set time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read settings file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse settings: {reason}")]
    Parse { reason: String },
}

/// Errors reported by, or about, the remote content service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP 4xx.
    #[error("Joystick returned status code {status} (body: {body})")]
    BadRequest { status: u16, body: String },

    /// HTTP 5xx.
    #[error("Joystick returned status code {status} (body: {body})")]
    ServerError { status: u16, body: String },

    /// Any other non-200 status.
    #[error("Joystick returned status code {status} (body: {body})")]
    UnknownStatus { status: u16, body: String },

    /// 200 with a body that does not decode into the expected shape.
    #[error("Incorrect JSON was returned from Joystick API: {reason}")]
    MalformedResponse { reason: String },

    /// One or more requested ids came back as an error string.
    #[error("{}", list_failures(.errors))]
    PartialContent { errors: Vec<String> },

    /// A requested id is absent from an otherwise successful response.
    #[error("Content {content_id} is missing from the response")]
    MissingContent { content_id: String },
}

impl ApiError {
    /// Map a non-200 status to its error kind.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400..=499 => ApiError::BadRequest { status, body },
            s if s >= 500 => ApiError::ServerError { status, body },
            _ => ApiError::UnknownStatus { status, body },
        }
    }

    /// Status code for the HTTP-status kinds.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { status, .. }
            | ApiError::ServerError { status, .. }
            | ApiError::UnknownStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Cache store failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache key derivation failed: {reason}")]
    KeyDerivation { reason: String },

    #[error("Cache store operation failed: {reason}")]
    Store { reason: String },
}

/// Boxed error produced by an HTTP sender.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Master error type for all Joystick client errors.
#[derive(Debug, Error)]
pub enum JoystickError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Network-level failure from the HTTP sender, passed through as-is.
    #[error(transparent)]
    Transport(TransportError),
}

impl JoystickError {
    pub fn transport(err: impl Into<TransportError>) -> Self {
        JoystickError::Transport(err.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, JoystickError::Validation(_))
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            JoystickError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for Joystick client operations.
pub type JoystickResult<T> = Result<T, JoystickError>;

// =============================================================================
// TESTS
// =============================================================================
