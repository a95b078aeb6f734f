//! REST client for the hosted identity API.

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::provider::{AuthUser, IdentityConfig, IdentityProvider};
use crate::token::{AuthResponse, ErrorResponse, Token};

const SIGN_UP: &str = "accounts:signUp";
const SIGN_IN: &str = "accounts:signInWithPassword";

/// HTTP implementation of [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct IdentityClient {
    config: IdentityConfig,
    http_client: Client,
}

impl IdentityClient {
    /// Creates a new identity client.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    /// The configuration this client talks to.
    #[must_use]
    pub const fn config(&self) -> &IdentityConfig {
        &self.config
    }

    async fn authenticate(&self, method: &str, email: &str, password: &str) -> Result<AuthUser> {
        let url = self.config.endpoint(method)?;
        debug!("{method} for {email}");

        let response = self
            .http_client
            .post(url)
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;
            return Err(error.into_error());
        }

        let auth: AuthResponse = response.json().await?;
        let token = Token::from_response(&auth)?;
        let email = if auth.email.is_empty() {
            email.to_string()
        } else {
            auth.email
        };

        Ok(AuthUser {
            user_id: auth.local_id,
            email,
            token,
        })
    }
}

impl IdentityProvider for IdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.authenticate(SIGN_UP, email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.authenticate(SIGN_IN, email, password).await
    }
}
