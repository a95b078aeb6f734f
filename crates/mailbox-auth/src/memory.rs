//! In-process identity provider.
//!
//! Applies the same rejection rules as the hosted provider for the cases the
//! account screens care about: duplicate accounts, weak passwords, malformed
//! addresses and bad credentials.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};

use crate::error::{Error, Result};
use crate::provider::{AuthUser, IdentityProvider};
use crate::token::Token;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
struct Account {
    user_id: String,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    calls: usize,
    issued: u64,
}

fn issue(issued: &mut u64, account: &Account) -> AuthUser {
    *issued += 1;
    AuthUser {
        user_id: account.user_id.clone(),
        email: account.email.clone(),
        token: Token::new(format!("memory-token-{issued}"))
            .with_expires_at(Utc::now() + Duration::hours(1)),
    }
}

/// Shared in-memory [`IdentityProvider`]. Clones share the same accounts.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentity {
    state: Arc<Mutex<State>>,
}

impl MemoryIdentity {
    /// Creates a provider without accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of sign-up and sign-in calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.state().calls
    }

    /// Whether an account exists for the address.
    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.state().accounts.contains_key(&email.to_lowercase())
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let mut guard = self.state();
        let State {
            accounts,
            calls,
            issued,
        } = &mut *guard;
        *calls += 1;

        if !email.contains('@') {
            return Err(Error::rejected("INVALID_EMAIL", ""));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::rejected(
                "WEAK_PASSWORD",
                "Password should be at least 6 characters",
            ));
        }
        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(Error::rejected("EMAIL_EXISTS", ""));
        }

        let account = Account {
            user_id: format!("uid-{}", accounts.len() + 1),
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = issue(issued, &account);
        accounts.insert(key, account);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let mut guard = self.state();
        let State {
            accounts,
            calls,
            issued,
        } = &mut *guard;
        *calls += 1;

        match accounts.get(&email.to_lowercase()) {
            Some(account) if account.password == password => Ok(issue(issued, account)),
            _ => Err(Error::rejected("INVALID_LOGIN_CREDENTIALS", "")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_then_sign_in() {
        let provider = MemoryIdentity::new();

        let created = tokio_test::block_on(provider.sign_up("user@example.com", "secret1")).unwrap();
        assert_eq!(created.email, "user@example.com");
        assert!(!created.token.is_expired());

        let signed_in = tokio_test::block_on(provider.sign_in("USER@example.com", "secret1")).unwrap();
        assert_eq!(signed_in.user_id, created.user_id);
        assert_ne!(signed_in.token.id_token, created.token.id_token);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() {
        let provider = MemoryIdentity::new();
        provider.sign_up("user@example.com", "secret1").await.unwrap();

        let error = provider.sign_up("user@example.com", "other99").await.unwrap_err();
        assert_eq!(error.code(), Some("EMAIL_EXISTS"));
    }

    #[tokio::test]
    async fn test_weak_password_and_bad_email_rejected() {
        let provider = MemoryIdentity::new();
        let weak = provider.sign_up("user@example.com", "abc").await.unwrap_err();
        assert_eq!(weak.code(), Some("WEAK_PASSWORD"));

        let bad = provider.sign_up("userexample.com", "secret1").await.unwrap_err();
        assert_eq!(bad.code(), Some("INVALID_EMAIL"));
        assert!(!provider.has_account("user@example.com"));
    }

    #[tokio::test]
    async fn test_bad_credentials_rejected() {
        let provider = MemoryIdentity::new();
        provider.sign_up("user@example.com", "secret1").await.unwrap();

        let wrong = provider.sign_in("user@example.com", "nope123").await.unwrap_err();
        assert_eq!(wrong.code(), Some("INVALID_LOGIN_CREDENTIALS"));
        let unknown = provider.sign_in("ghost@example.com", "secret1").await.unwrap_err();
        assert_eq!(unknown.code(), Some("INVALID_LOGIN_CREDENTIALS"));

        assert!(provider.has_account("user@example.com"));
    }
}
