//! Error types for the SoundCloud backend

/// Result type alias for SoundCloud operations
pub type Result<T> = std::result::Result<T, SoundCloudError>;

/// Errors that can occur when talking to SoundCloud
#[derive(Debug, thiserror::Error)]
pub enum SoundCloudError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URI does not encode a SoundCloud track id
    #[error("Invalid track URI: {0}")]
    InvalidTrackUri(String),

    /// Authentication failed (invalid or missing auth_token)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Daily rate limit reached
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    /// API returned an error status
    #[error("SoundCloud API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SoundCloudError {
    /// Create an error from an HTTP status code and a message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimitExceeded,
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SoundCloudError::NotFound(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, SoundCloudError::Unauthorized(_))
    }
}

impl From<SoundCloudError> for pmosource::BackendError {
    fn from(error: SoundCloudError) -> Self {
        match error {
            SoundCloudError::InvalidTrackUri(uri) => pmosource::BackendError::InvalidUri(uri),
            other => pmosource::BackendError::backend("soundcloud", other),
        }
    }
}
