//! Errors raised by the Sakila API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the remote Sakila API.
///
/// Each failure class the handlers care about has its own variant so callers
/// branch on structure instead of inspecting message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote rejected the credentials or the bearer token (401/403).
    #[error("API error {status}: {message}")]
    Unauthorized { status: u16, message: String },

    /// The request conflicts with remote state (409), e.g. deleting a
    /// customer that still has rentals.
    #[error("API error 409: {message}")]
    Conflict { message: String },

    /// The resource does not exist (404).
    #[error("API error 404: {message}")]
    NotFound { message: String },

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body could not be decoded.
    #[error("Invalid API response: {0}")]
    Decode(String),

    /// Any other non-success status.
    #[error("API error {status}: {message}")]
    Unexpected { status: u16, message: String },
}

impl ApiError {
    /// Classify a non-success response.
    ///
    /// `body` is the raw response text; FastAPI-style `{"detail": ...}`
    /// bodies are reduced to their human-readable part.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(status, body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => Self::NotFound { message },
            StatusCode::CONFLICT => Self::Conflict { message },
            _ => Self::Unexpected {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status returned by the remote, if the call got that far.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Unexpected { status, .. } => Some(*status),
            Self::Conflict { .. } => Some(409),
            Self::NotFound { .. } => Some(404),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }

    /// Whether the session's token is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

fn extract_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            // Validation failures: [{"loc": [...], "msg": "...", ...}, ...]
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
    }

    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_statuses() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::Unauthorized { status: 403, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, ""),
            ApiError::Conflict { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ApiError::Unexpected { status: 500, .. }
        ));
    }

    #[test]
    fn test_detail_string_becomes_message() {
        let err = ApiError::from_status(
            StatusCode::CONFLICT,
            r#"{"detail": "Customer has existing rentals"}"#,
        );
        assert_eq!(err.to_string(), "API error 409: Customer has existing rentals");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_validation_detail_list_is_joined() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "store_id"], "msg": "field required"},
                           {"loc": ["body", "email"], "msg": "value is not a valid email"}]}"#,
        );
        assert_eq!(
            err.to_string(),
            "API error 422: field required; value is not a valid email"
        );
    }

    #[test]
    fn test_plain_and_empty_bodies() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "API error 502: upstream down");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "API error 404: Not Found");
    }

    #[test]
    fn test_decode_has_no_status() {
        assert_eq!(ApiError::Decode("eof".to_string()).status(), None);
    }
}
