//! Sign-up, login and logout.

use mailbox_auth::{AuthUser, IdentityProvider};
use tracing::{info, warn};

use crate::session::{Session, SessionSlot};
use crate::validation::{LoginForm, SignUpForm, ValidationError};

/// Errors surfaced by the account screens.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The form failed client-side checks; nothing was sent.
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// Login was refused. Deliberately says nothing about why.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The provider refused to create the account.
    #[error("{0}")]
    Rejected(String),

    /// The session slot could not be updated.
    #[error("Session error: {0}")]
    Session(#[from] crate::Error),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// User-facing text for a provider rejection code.
#[must_use]
pub fn rejection_message(error: &mailbox_auth::Error) -> String {
    match error.code() {
        Some("EMAIL_EXISTS") => "An account with this email already exists".to_string(),
        Some("INVALID_EMAIL") => "Valid email required".to_string(),
        Some("WEAK_PASSWORD") => "Password must be at least 6 characters".to_string(),
        Some("OPERATION_NOT_ALLOWED") => "Password sign-up is disabled".to_string(),
        Some("TOO_MANY_ATTEMPTS_TRY_LATER") => {
            "Too many attempts, please try again later".to_string()
        }
        _ => error.to_string(),
    }
}

/// Create an account.
///
/// The form is validated first; the provider is only contacted when every
/// rule passes. No session is started.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] or the provider's rejection.
pub async fn sign_up<P: IdentityProvider>(
    provider: &P,
    form: &SignUpForm,
) -> Result<AuthUser, AccountError> {
    form.validate().map_err(AccountError::Validation)?;

    match provider.sign_up(form.email.trim(), &form.password).await {
        Ok(user) => {
            info!("User has successfully signed up: {}", user.email);
            Ok(user)
        }
        Err(error) => {
            warn!("Sign-up failed: {error}");
            Err(AccountError::Rejected(rejection_message(&error)))
        }
    }
}

/// Authenticate and start a session.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] for missing fields,
/// [`AccountError::InvalidCredentials`] for any provider failure, or a
/// session error if the slot cannot be written.
pub async fn log_in<P: IdentityProvider>(
    provider: &P,
    slot: &SessionSlot,
    form: &LoginForm,
) -> Result<Session, AccountError> {
    form.validate().map_err(AccountError::Validation)?;

    let user = provider
        .sign_in(form.email.trim(), &form.password)
        .await
        .map_err(|error| {
            warn!("Login error: {error}");
            AccountError::InvalidCredentials
        })?;

    let session = Session::new(user.email).with_token(user.token);
    slot.save(&session).await?;
    info!("User logged in successfully: {}", session.email);
    Ok(session)
}

/// End the session.
///
/// # Errors
///
/// Returns an error if the slot cannot be cleared.
pub async fn log_out(slot: &SessionSlot) -> crate::Result<()> {
    slot.clear().await
}
