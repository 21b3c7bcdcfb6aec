use thiserror::Error;

/// Failure reported by a [`MediaServerApi`](crate::api::MediaServerApi)
/// implementation. Every variant carries a message fit for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unauthorized - please sign in again")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request was abandoned by the caller. Never shown to users.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Whether repeating the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Unauthorized
            | ApiError::NotFound(_)
            | ApiError::Decode(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Cancelled => false,
        }
    }
}

/// Failure reported by a [`UserStore`](crate::store::UserStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("storage error: {0}")]
    Backend(String),
}
