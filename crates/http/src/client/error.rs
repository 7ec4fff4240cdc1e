//! Client error types

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Non-2xx answer from the upstream API
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamError {
    pub status: StatusCode,
    /// Parsed JSON body, or the raw text as a JSON string when the body is
    /// not JSON
    pub body: Value,
}

impl UpstreamError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Field-level messages from a validation error body
    ///
    /// Understands the usual REST framework shapes: `{"detail": "..."}`,
    /// `{"field": ["msg", ...]}`, `{"non_field_errors": [...]}` and a bare
    /// list or string.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        match &self.body {
            Value::Object(fields) => {
                for (field, value) in fields {
                    let prefix = match field.as_str() {
                        "detail" | "non_field_errors" | "message" | "error" => None,
                        other => Some(other),
                    };
                    for text in flatten_text(value) {
                        messages.push(match prefix {
                            Some(field) => format!("{field}: {text}"),
                            None => text,
                        });
                    }
                }
            }
            other => messages.extend(flatten_text(other)),
        }
        messages
    }

    /// All messages joined into one line, or the status reason when the body
    /// carries none
    pub fn summary(&self) -> String {
        let messages = self.messages();
        if messages.is_empty() {
            self.status
                .canonical_reason()
                .unwrap_or("Upstream error")
                .to_string()
        } else {
            messages.join("; ")
        }
    }
}

fn flatten_text(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) if !text.is_empty() => vec![text.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_text).collect(),
        Value::Object(_) => vec![value.to_string()],
        Value::Number(number) => vec![number.to_string()],
        _ => Vec::new(),
    }
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// The upstream did not answer within the configured timeout
    #[error("Upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection could not be established
    #[error("Upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Upstream returned a non-success status
    #[error("Upstream error {}: {}", .0.status, .0.summary())]
    Upstream(UpstreamError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_connect() {
            Self::Unreachable(err)
        } else {
            Self::Request(err)
        }
    }
}

impl ClientError {
    /// Status code of an upstream answer, if there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream(upstream) => Some(upstream.status),
            _ => None,
        }
    }

    /// Whether the upstream rejected the request's credentials
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the upstream could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unreachable(_))
    }

    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::Upstream(upstream) => Some(upstream),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_messages_are_prefixed() {
        let error = UpstreamError::new(
            StatusCode::BAD_REQUEST,
            json!({
                "email": ["Enter a valid email address."],
                "non_field_errors": ["Passwords do not match."]
            }),
        );
        let summary = error.summary();
        assert!(summary.contains("email: Enter a valid email address."));
        assert!(summary.contains("Passwords do not match."));
        assert!(!summary.contains("non_field_errors"));
    }

    #[test]
    fn test_detail_message() {
        let error = UpstreamError::new(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}),
        );
        let messages = error.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&"Token is invalid or expired".to_string()));
        assert!(messages.contains(&"code: token_not_valid".to_string()));
    }

    #[test]
    fn test_summary_falls_back_to_reason() {
        let error = UpstreamError::new(StatusCode::BAD_GATEWAY, Value::Null);
        assert_eq!(error.summary(), "Bad Gateway");
    }

    #[test]
    fn test_unauthorized_detection() {
        let error = ClientError::Upstream(UpstreamError::new(StatusCode::UNAUTHORIZED, json!({})));
        assert!(error.is_unauthorized());
        assert!(!error.is_unreachable());

        let error = ClientError::Upstream(UpstreamError::new(StatusCode::FORBIDDEN, json!({})));
        assert!(!error.is_unauthorized());
    }
}
