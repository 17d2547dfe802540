use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors reported by the hosted auth and storage services
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let msg = if message.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            message
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Unauthorized(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(msg),
            StatusCode::CONFLICT => ApiError::Conflict(msg),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            status if status.is_client_error() => ApiError::BadRequest(msg),
            _ => ApiError::Unknown(msg),
        }
    }

    /// Build an error from a failed response body.
    ///
    /// GoTrue answers with `msg` or `error_description`, PostgREST with
    /// `message` (plus `details`/`hint`); anything else is passed through.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        Self::from_status(status, error_message(body))
    }

    /// Whether the backend rejected the caller's credentials or token
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::AuthenticationFailed(_) | ApiError::Unauthorized(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status, err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    let message = ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    match (message, fields.get("details").and_then(Value::as_str)) {
        (Some(message), Some(details)) if !details.is_empty() => {
            format!("{} ({})", message, details)
        }
        (Some(message), _) => message,
        (None, _) => trimmed.to_string(),
    }
}
