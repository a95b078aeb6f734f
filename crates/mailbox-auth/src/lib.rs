//! # mailbox-auth
//!
//! Email/password accounts against a hosted identity provider.
//!
//! ## Features
//!
//! - **Sign-up and sign-in** over the provider's REST API
//! - **Id tokens** with expiry checking
//! - **Provider errors** surfaced with their code (`EMAIL_EXISTS`, `WEAK_PASSWORD`, ...)
//! - **In-memory provider** for tests and offline demos
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbox_auth::{IdentityClient, IdentityConfig, IdentityProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IdentityClient::new(IdentityConfig::new("your_api_key")?);
//!     let user = client.sign_in("user@example.com", "secret").await?;
//!     println!("Signed in as {}", user.email);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod memory;
mod provider;
pub mod token;

pub use client::IdentityClient;
pub use error::{Error, Result};
pub use memory::MemoryIdentity;
pub use provider::{AuthUser, DEFAULT_IDENTITY_URL, IdentityConfig, IdentityProvider};
pub use token::Token;
