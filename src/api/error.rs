//! API Error Types
//!
//! Every backend failure is folded into one [`ApiError`]: a human-readable
//! message, the HTTP status (0 when the server was never reached) and any
//! structured validation errors the backend sent along.
//!
//! Backends in the wild send errors as `{ message }`, `{ message, errors:
//! { field: [..] } }`, `{ errors: [{ message }] }`, plain text, or nothing
//! at all. The raw shapes below decode each of those explicitly.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Longest raw body excerpt carried in an error message
const RAW_BODY_LIMIT: usize = 300;

/// Message a fetch-style fallback body carries; never surfaced as-is
const GENERIC_FAILURE: &str = "Server request failed";

/// Normalized error from the HTTP access layer
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message
    pub message: String,
    /// HTTP status code, 0 for network-level failures
    pub status: u16,
    /// Structured validation errors, when the backend sent any
    pub errors: Option<ValidationErrors>,
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Structured validation errors from an error body
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrors {
    /// `{ "field": ["problem", ...] }`
    Fields(BTreeMap<String, Vec<String>>),
    /// `[{ "message": "problem" }, ...]`
    List(Vec<ErrorItem>),
}

/// One entry of a list-shaped validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorItem {
    pub message: String,
    pub field: Option<String>,
}

impl ValidationErrors {
    /// Every message, flattened in field order
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationErrors::Fields(fields) => fields.values().flatten().cloned().collect(),
            ValidationErrors::List(items) => items.iter().map(|i| i.message.clone()).collect(),
        }
    }

    /// One line per field (`field: a, b`) or per list entry
    pub fn lines(&self) -> Vec<String> {
        match self {
            ValidationErrors::Fields(fields) => fields
                .iter()
                .map(|(field, problems)| format!("{}: {}", field, problems.join(", ")))
                .collect(),
            ValidationErrors::List(items) => items.iter().map(|i| i.message.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ValidationErrors::Fields(fields) => fields.is_empty(),
            ValidationErrors::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

// ============================================
// Raw error body shapes
// ============================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    errors: Option<RawErrors>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMessage {
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawErrors {
    List(Vec<RawErrorItem>),
    Fields(BTreeMap<String, RawFieldMessages>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFieldMessages {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawErrorItem {
    Detailed {
        message: String,
        #[serde(default)]
        field: Option<String>,
    },
    Other(serde_json::Value),
}

impl RawErrors {
    fn into_validation(self) -> Option<ValidationErrors> {
        let errors = match self {
            RawErrors::List(items) => ValidationErrors::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        RawErrorItem::Detailed { message, field } => ErrorItem { message, field },
                        RawErrorItem::Other(value) => ErrorItem {
                            message: value.to_string(),
                            field: None,
                        },
                    })
                    .collect(),
            ),
            RawErrors::Fields(fields) => ValidationErrors::Fields(
                fields
                    .into_iter()
                    .map(|(field, problems)| {
                        let problems = match problems {
                            RawFieldMessages::Many(list) => list,
                            RawFieldMessages::One(text) => vec![text],
                        };
                        (field, problems)
                    })
                    .collect(),
            ),
            RawErrors::Other(_) => return None,
        };

        if errors.is_empty() {
            None
        } else {
            Some(errors)
        }
    }
}

impl ApiError {
    /// Error for a request that never got an HTTP response
    pub fn network(base_url: &str, details: impl fmt::Display) -> Self {
        Self {
            message: format!(
                "Network Error: Could not connect to the server at {}. Please check your network \
                 connection and ensure the server is running. (Details: {})",
                base_url, details
            ),
            status: 0,
            errors: None,
        }
    }

    /// Error for a success response whose body could not be used
    pub fn invalid_response(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            errors: None,
        }
    }

    /// Normalize a non-success response.
    ///
    /// `reason` is the status line text; `body` is the raw response text,
    /// possibly empty.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();

        let (body_message, errors, raw_body) = match parsed {
            Some(parsed) => {
                let message = match parsed.message {
                    Some(RawMessage::Text(text))
                        if !text.trim().is_empty() && text != GENERIC_FAILURE =>
                    {
                        Some(text)
                    }
                    _ => None,
                };
                let errors = parsed.errors.and_then(RawErrors::into_validation);
                (message, errors, None)
            }
            None => (None, None, Some(body)),
        };

        let from_body = body_message.is_some();
        let status_marker = format!("status {}", status);

        let mut message = if let Some(message) = body_message {
            message
        } else if let Some(ValidationErrors::List(items)) = &errors {
            items
                .iter()
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        } else if let Some(raw) = raw_body.filter(|raw| !raw.trim().is_empty()) {
            truncate(raw, RAW_BODY_LIMIT)
        } else if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            reason.to_string()
        } else {
            format!("Request failed with {}", status_marker)
        };

        if !from_body && !message.to_lowercase().contains(&status_marker) {
            message = format!("Status {}: {}", status, message);
        }

        Self {
            message,
            status,
            errors,
        }
    }

    /// Whether the server was never reached
    pub fn is_network(&self) -> bool {
        self.status == 0
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Validation details one per line, falling back to the message.
    ///
    /// This is what the admin forms show after a rejected submit.
    pub fn validation_summary(&self) -> String {
        match &self.errors {
            Some(errors) if !errors.is_empty() => errors.lines().join("\n"),
            _ => self.message.clone(),
        }
    }

    /// Replace the message with the flattened validation messages joined
    /// by `separator`, when there are any.
    pub fn with_validation_message(mut self, separator: &str) -> Self {
        if let Some(errors) = &self.errors {
            let messages = errors.messages();
            if !messages.is_empty() {
                self.message = messages.join(separator);
            }
        }
        self
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_json_body() {
        let err = ApiError::from_response(
            401,
            Some("Unauthorized"),
            r#"{"message":"Invalid email or password"}"#,
        );
        assert_eq!(err.message, "Invalid email or password");
        assert_eq!(err.status, 401);
        assert!(err.errors.is_none());
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_field_errors_are_decoded() {
        let body = r#"{
            "message": "Validation failed",
            "errors": { "price": ["must be positive"], "model": "is required" }
        }"#;
        let err = ApiError::from_response(400, Some("Bad Request"), body);

        assert_eq!(err.message, "Validation failed");
        let mut expected = BTreeMap::new();
        expected.insert("model".to_string(), vec!["is required".to_string()]);
        expected.insert("price".to_string(), vec!["must be positive".to_string()]);
        assert_eq!(err.errors, Some(ValidationErrors::Fields(expected)));
        assert_eq!(
            err.validation_summary(),
            "model: is required\nprice: must be positive"
        );
    }

    #[test]
    fn test_list_errors_become_message() {
        let body = r#"{"errors":[{"message":"brand is required"},{"message":"stock must be an integer","field":"stock"}]}"#;
        let err = ApiError::from_response(422, Some("Unprocessable Entity"), body);

        assert_eq!(
            err.message,
            "Status 422: brand is required, stock must be an integer"
        );
        match err.errors {
            Some(ValidationErrors::List(ref items)) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].field.as_deref(), Some("stock"));
            }
            ref other => panic!("unexpected errors: {:?}", other),
        }
    }

    #[test]
    fn test_raw_text_fallback() {
        let err = ApiError::from_response(502, Some("Bad Gateway"), "upstream timed out");
        assert_eq!(err.message, "Status 502: upstream timed out");
        assert!(err.errors.is_none());
    }

    #[test]
    fn test_raw_text_is_truncated() {
        let body = "x".repeat(400);
        let err = ApiError::from_response(500, None, &body);
        let expected = format!("Status 500: {}...", "x".repeat(300));
        assert_eq!(err.message, expected);
    }

    #[test]
    fn test_status_line_fallback() {
        let err = ApiError::from_response(503, Some("Service Unavailable"), "");
        assert_eq!(err.message, "Status 503: Service Unavailable");
    }

    #[test]
    fn test_bare_status_fallback_is_not_prefixed_twice() {
        let err = ApiError::from_response(599, None, "");
        assert_eq!(err.message, "Request failed with status 599");
    }

    #[test]
    fn test_generic_message_is_ignored() {
        let err = ApiError::from_response(500, Some("Internal Server Error"), r#"{"message":"Server request failed"}"#);
        assert_eq!(err.message, "Status 500: Internal Server Error");
    }

    #[test]
    fn test_unrecognized_errors_shape_is_dropped() {
        let err = ApiError::from_response(400, Some("Bad Request"), r#"{"message":"Bad","errors":"nope"}"#);
        assert_eq!(err.message, "Bad");
        assert!(err.errors.is_none());
    }

    #[test]
    fn test_network_error() {
        let err = ApiError::network("http://localhost:3000/api", "connection refused");
        assert!(err.is_network());
        assert_eq!(err.status, 0);
        assert!(err.message.starts_with("Network Error: Could not connect to the server"));
        assert!(err.message.contains("connection refused"));
    }

    #[test]
    fn test_with_validation_message() {
        let body = r#"{"message":"Invalid","errors":{"email":["already taken"],"username":["too short"]}}"#;
        let err = ApiError::from_response(400, None, body).with_validation_message(", ");
        assert_eq!(err.message, "already taken, too short");

        let plain = ApiError::from_response(409, None, r#"{"message":"Conflict"}"#)
            .with_validation_message(", ");
        assert_eq!(plain.message, "Conflict");
    }
}
