//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Store request failed.
    #[error("Store error: {0}")]
    Store(#[from] mailbox_store::Error),

    /// Identity provider request failed.
    #[error("Identity error: {0}")]
    Auth(#[from] mailbox_auth::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No user is logged in.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The stored token has expired.
    #[error("Session expired, log in again")]
    SessionExpired,

    /// No message with this id in the folder.
    #[error("Message not found: {0}")]
    MessageNotFound(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
