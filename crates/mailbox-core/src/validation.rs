//! Sign-up and login form validation.
//!
//! Everything here runs before any remote call. The identity provider still
//! validates on its side; its rejections arrive later through
//! [`AccountError`](crate::AccountError).

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validation error for account forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// Password is empty.
    EmptyPassword,
    /// Password is shorter than [`MIN_PASSWORD_LEN`].
    PasswordTooShort,
    /// Confirmation differs from the password.
    PasswordMismatch,
    /// Terms were not accepted.
    TermsNotAccepted,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "Email is required",
            Self::InvalidEmail => "Valid email required",
            Self::EmptyPassword => "Password is required",
            Self::PasswordTooShort => "Password must be at least 6 characters",
            Self::PasswordMismatch => "Passwords do not match",
            Self::TermsNotAccepted => "You must agree to the terms",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyPassword | Self::PasswordTooShort => "password",
            Self::PasswordMismatch => "confirm",
            Self::TermsNotAccepted => "agree",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a form.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Check the minimal `non-space@non-space.non-space` address shape.
///
/// Surrounding whitespace is ignored; whitespace anywhere else rejects.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    // Stricter than an unanchored pattern match: "us er@example.com" is rejected.
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    email.match_indices('@').any(|(at, _)| {
        let domain = &email[at + 1..];
        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

/// Passwords need at least [`MIN_PASSWORD_LEN`] characters.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// The confirmation must equal the password exactly.
#[must_use]
pub fn passwords_match(password: &str, confirm: &str) -> bool {
    password == confirm
}

/// The terms checkbox must be ticked.
#[must_use]
pub const fn terms_accepted(agree: bool) -> bool {
    agree
}

/// Fields of the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub confirm: String,
    /// Whether the terms were accepted.
    pub agree: bool,
}

impl SignUpForm {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns every failing rule, in field order.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if !is_valid_email(&self.email) {
            errors.push(ValidationError::InvalidEmail);
        }
        if !is_strong_password(&self.password) {
            errors.push(ValidationError::PasswordTooShort);
        }
        if !passwords_match(&self.password, &self.confirm) {
            errors.push(ValidationError::PasswordMismatch);
        }
        if !terms_accepted(self.agree) {
            errors.push(ValidationError::TermsNotAccepted);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Fields of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginForm {
    /// Both fields are required; their content is left to the provider.
    ///
    /// # Errors
    ///
    /// Returns the missing fields.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if self.email.trim().is_empty() {
            errors.push(ValidationError::EmptyEmail);
        }
        if self.password.is_empty() {
            errors.push(ValidationError::EmptyPassword);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
