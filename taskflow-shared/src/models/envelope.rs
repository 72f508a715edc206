use serde::{Deserialize, Serialize};

/// Normalized response envelope returned by every backend endpoint.
///
/// A well-formed body with `success: false` is a business failure, not a
/// transport error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// Whether the backend accepted the operation.
    #[serde(default)]
    pub success: bool,

    /// Operation payload, when there is one.
    pub data: Option<T>,

    /// Human readable status or failure message.
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Business failure with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Backend message or `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// `Some(data)` only for a successful envelope that carries data.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}
