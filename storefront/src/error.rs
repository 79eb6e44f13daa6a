//! Error types.

use thiserror::Error;

/// The main error type for storefront operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-related error from the HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A non-reqwest transport could not deliver the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service rejected the presented credential (HTTP 401).
    #[error("Session expired or credential rejected")]
    Unauthorized,

    /// The service returned a non-success response.
    #[error("API error [{status}]: {}", describe_payload(.payload))]
    Api {
        status: u16,
        payload: serde_json::Value,
    },

    /// Input rejected before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// Operation requires an authenticated session.
    #[error("Authentication required")]
    AuthRequired,

    /// A required field was missing in the response.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Invalid argument passed to an API method.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Session storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create an API error from a status and response payload.
    pub fn api(status: u16, payload: serde_json::Value) -> Self {
        Error::Api { status, payload }
    }

    /// Create a local validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Create a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingField(field.into())
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthorized | Error::AuthRequired)
    }

    /// Check if the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Transport(_))
    }

    /// HTTP status of a server-reported error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// Text suitable for a transient user notification.
    ///
    /// Server errors prefer the payload's `error` or `detail` field, then the
    /// payload itself. An empty payload and every non-server error other than
    /// validation fall back.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api { payload, .. } => payload_message(payload)
                .or_else(|| verbatim(payload))
                .unwrap_or_else(|| fallback.to_owned()),
            Error::Validation(msg) => msg.clone(),
            _ => fallback.to_owned(),
        }
    }

    /// Raw server payload rendered as JSON text, if any.
    pub fn raw_payload(&self) -> Option<String> {
        match self {
            Error::Api { payload, .. } => Some(payload.to_string()),
            _ => None,
        }
    }
}

fn describe_payload(payload: &serde_json::Value) -> String {
    payload_message(payload).unwrap_or_else(|| payload.to_string())
}

fn payload_message(payload: &serde_json::Value) -> Option<String> {
    ["error", "detail", "message"]
        .iter()
        .find_map(|field| payload.get(field).and_then(|v| v.as_str()))
        .map(str::to_owned)
}

fn verbatim(payload: &serde_json::Value) -> Option<String> {
    use serde_json::Value;
    match payload {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Result type alias for storefront operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let e = Error::api(400, json!({"error": "Invalid credentials"}));
        assert_eq!(format!("{}", e), "API error [400]: Invalid credentials");

        let e = Error::api(400, json!({"username": ["already taken"]}));
        assert_eq!(
            format!("{}", e),
            r#"API error [400]: {"username":["already taken"]}"#
        );
    }

    #[test]
    fn test_user_message() {
        let e = Error::api(400, json!({"error": "Out of stock"}));
        assert_eq!(e.user_message("Failed"), "Out of stock");

        let e = Error::api(403, json!({"detail": "Not allowed"}));
        assert_eq!(e.user_message("Failed"), "Not allowed");

        let e = Error::api(500, json!("oops"));
        assert_eq!(e.user_message("Failed"), "oops");

        let e = Error::api(400, json!({"username": ["already taken"]}));
        assert_eq!(e.user_message("Failed"), r#"{"username":["already taken"]}"#);

        assert_eq!(Error::api(400, json!(null)).user_message("Login failed"), "Login failed");
        assert_eq!(Error::api(400, json!({})).user_message("Login failed"), "Login failed");

        assert_eq!(Error::Unauthorized.user_message("Failed"), "Failed");
        assert_eq!(
            Error::validation("Please enter UPI ID").user_message("Failed"),
            "Please enter UPI ID"
        );
    }

    #[test]
    fn test_classification() {
        assert!(Error::Unauthorized.is_auth_error());
        assert!(Error::AuthRequired.is_auth_error());
        assert!(!Error::api(400, json!({})).is_auth_error());
        assert!(Error::Transport("refused".into()).is_network());
        assert_eq!(Error::Unauthorized.status(), Some(401));
    }
}
