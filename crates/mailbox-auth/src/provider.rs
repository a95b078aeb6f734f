//! Identity provider configuration and the operations it offers.

use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::token::Token;

/// Default endpoint root of the hosted identity API.
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Public API key of the project.
    pub api_key: String,
    /// Endpoint root.
    pub base_url: Url,
}

impl IdentityConfig {
    /// Creates a configuration for the hosted endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_IDENTITY_URL)
    }

    /// Creates a configuration for a custom endpoint root.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the URL is invalid.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl AsRef<str>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("API key is required".to_string()));
        }
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "{base_url} cannot be used as an endpoint root"
            )));
        }
        Ok(Self { api_key, base_url })
    }

    /// URL of an account endpoint, e.g. `accounts:signUp`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn endpoint(&self, method: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(method);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

/// A user the provider has authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-internal user id.
    pub user_id: String,
    /// Email address of the account.
    pub email: String,
    /// Id token for this sign-in.
    pub token: Token,
}

/// Email/password account operations of an identity provider.
pub trait IdentityProvider {
    /// Create an account; the new user is signed in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Verify credentials of an existing account.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser>> + Send;
}
