//! The signed-in user and the slot that persists it.
//!
//! A [`Session`] is passed explicitly to every store operation; nothing reads
//! the current user from global state. The [`SessionSlot`] is the single
//! persisted value from which a session is restored between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mailbox_auth::Token;
use mailbox_store::PartitionKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// The user the client acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Email address, used verbatim as identity.
    pub email: String,
    /// Token issued by the identity provider at login, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
}

impl Session {
    /// Creates a session for an address.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: None,
        }
    }

    /// Sets the provider token.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Id token sent with store requests.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.id_token.as_str())
    }

    /// Whether the provider token has run out. A session without a token never expires.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.token.as_ref().is_some_and(Token::is_expired)
    }

    /// Key addressing this user's folders in the store.
    #[must_use]
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey::from_email(&self.email)
    }
}

/// Persisted slot holding the current session as JSON.
#[derive(Debug, Clone)]
pub struct SessionSlot {
    path: PathBuf,
}

impl SessionSlot {
    /// Creates a slot backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the session.
    ///
    /// Returns `None` when the slot is empty or holds no address.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Session>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session stored at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&contents)?;
        if session.email.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Restore the session, failing when nobody is logged in or the token has expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] for an empty slot, [`Error::SessionExpired`]
    /// when the stored token is past its expiry, or the load error.
    pub async fn require(&self) -> Result<Session> {
        let session = self.load().await?.ok_or(Error::NotLoggedIn)?;
        if session.is_expired() {
            warn!("Session for {} has expired", session.email);
            return Err(Error::SessionExpired);
        }
        Ok(session)
    }

    /// Persist the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, contents).await?;
        info!("Session saved for {}", session.email);
        Ok(())
    }

    /// Forget the session. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
