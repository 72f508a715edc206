use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for API client calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Transport and HTTP-level failures.
///
/// A completed exchange whose envelope says `success: false` is *not* an
/// `ApiError`; callers see it as `Ok(ApiResponse { success: false, .. })`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 401, or an authenticated call attempted without a token.
    #[error("unauthorized{}", suffix(.message))]
    Unauthorized { message: Option<String> },

    /// HTTP 429.
    #[error("rate limited{}", suffix(.message))]
    RateLimited { message: Option<String> },

    /// Any other non-2xx status.
    #[error("request failed with {status}{}", suffix(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// A 2xx body that is not a valid envelope.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot address an endpoint.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl ApiError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { message },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { message },
            _ => Self::Status { status, message },
        }
    }

    /// Error for an authenticated call made while logged out.
    #[must_use]
    pub fn missing_token() -> Self {
        Self::Unauthorized {
            message: Some("No authentication token".to_string()),
        }
    }

    /// Whether the session should be dropped because of this error.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the backend throttled the request.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// HTTP status, when the exchange completed.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// The `message` field of the backend's error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::RateLimited { message }
            | Self::Status { message, .. } => message.as_deref(),
            Self::Network(_) | Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Text shown to the user: the backend message or `fallback`.
    #[must_use]
    pub fn display_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    /// Backend message, else this error's own description.
    #[must_use]
    pub fn detail(&self) -> String {
        self.server_message()
            .map_or_else(|| self.to_string(), ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, None).is_auth_failure());
        assert!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, None).is_rate_limited());

        let other = ApiError::from_status(StatusCode::BAD_REQUEST, Some("bad".to_string()));
        assert!(!other.is_auth_failure());
        assert_eq!(other.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_display_message_prefers_server_text() {
        let err = ApiError::from_status(
            StatusCode::CONFLICT,
            Some("Category has tasks".to_string()),
        );
        assert_eq!(
            err.display_message("Failed to delete category"),
            "Category has tasks"
        );

        let bare = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(
            bare.display_message("Failed to delete category"),
            "Failed to delete category"
        );
    }

    #[test]
    fn test_detail_falls_back_to_description() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.detail(), "request failed with 502 Bad Gateway");
    }

    #[test]
    fn test_missing_token_is_auth_failure() {
        let err = ApiError::missing_token();
        assert!(err.is_auth_failure());
        assert_eq!(err.to_string(), "unauthorized: No authentication token");
    }
}
