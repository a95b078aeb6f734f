//! Id tokens and the wire types of the identity API.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Id token issued to a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Id token string.
    pub id_token: String,
    /// Expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Creates a new token without expiry.
    #[must_use]
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            expires_at: None,
        }
    }

    /// Creates a token from an authentication response.
    ///
    /// # Errors
    ///
    /// Returns an error if `expiresIn` is not a number of seconds.
    pub fn from_response(response: &AuthResponse) -> Result<Self> {
        let expires_at = response
            .expires_in
            .as_deref()
            .map(|secs| {
                secs.trim().parse::<i64>().map_err(|_| {
                    Error::InvalidResponse(format!("expiresIn is not a number: {secs}"))
                })
            })
            .transpose()?
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(Self {
            id_token: response.id_token.clone(),
            expires_at,
        })
    }

    /// Checks if the token is expired (with 60 second buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() + Duration::seconds(60) >= exp)
    }

    /// Sets the expiration time.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Successful sign-up or sign-in response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Id token.
    pub id_token: String,
    /// Email address of the account.
    #[serde(default)]
    pub email: String,
    /// Lifetime of the id token in seconds, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
    /// Provider-internal user id.
    pub local_id: String,
}

/// Error response from the identity API.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error payload.
    pub error: ErrorBody,
}

/// Body of an error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// HTTP status echoed by the provider.
    #[serde(default)]
    pub code: u16,
    /// Error code, optionally followed by ` : ` and a detail.
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    /// Converts to an Error.
    #[must_use]
    pub fn into_error(self) -> Error {
        let message = self.error.message;
        match message.split_once(" : ") {
            Some((code, detail)) => Error::rejected(code.trim(), detail.trim()),
            None => Error::rejected(message.trim(), ""),
        }
    }
}
