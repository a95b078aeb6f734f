//! Error types for identity operations.

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Identity provider error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider refused the request.
    #[error("Identity provider error: {code}{}", detail_suffix(.message))]
    Rejected {
        /// Error code (e.g., `EMAIL_EXISTS`).
        code: String,
        /// Human-readable detail, possibly empty.
        message: String,
    },

    /// Invalid response from the provider.
    #[error("Invalid identity response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates a rejection from error code and detail.
    #[must_use]
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the provider error code, if this is a rejection.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

fn detail_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" - {message}")
    }
}
