//! # mailbox-core
//!
//! Core logic for the Mailbox webmail client.
//!
//! This crate provides:
//! - Form validation for sign-up and login
//! - The persisted session and the account flows that start and end it
//! - **Folder views** - sorted records, unread counts, mark-read and delete
//! - **Compose/Send** - the dual write into `sent` and the recipient's `inbox`
//!
//! Every operation that touches the store takes an explicit [`Session`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod compose;
mod error;
pub mod folder_view;
pub mod session;
pub mod validation;

pub use account::{AccountError, log_in, log_out, rejection_message, sign_up};
pub use compose::{Draft, DraftField, PartialWrite, SendError, SendReceipt, send_mail};
pub use error::{Error, Result};
pub use folder_view::{FolderSummary, FolderView, LoadState, Mailbox, load_counts};
pub use session::{Session, SessionSlot};
pub use validation::{
    LoginForm, MIN_PASSWORD_LEN, SignUpForm, ValidationError, ValidationResult, is_strong_password,
    is_valid_email, passwords_match, terms_accepted,
};
