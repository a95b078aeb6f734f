//! # mailbox-store
//!
//! Client for the hosted document store that holds every user's mail.
//!
//! ## Features
//!
//! - **Addressing**: users are partitioned by their email address with `.`
//!   replaced by `_`; each user has an `inbox` and a `sent` folder
//! - **REST client**: `GET` a folder, `POST` a record, `PATCH` a read flag,
//!   `DELETE` a record
//! - **Normalization**: null, sequence and keyed-mapping folder bodies all
//!   become the same list of [`MessageRecord`]s
//! - **In-memory store**: same semantics without a network, for tests and demos
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbox_store::{Folder, MailStore, PartitionKey, StoreClient, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::new("https://my-project-default-rtdb.firebaseio.com")?;
//!     let store = StoreClient::new(config);
//!
//!     let user = PartitionKey::from_email("alice@example.com");
//!     for record in store.list(&user, Folder::Inbox).await? {
//!         println!("{} {}", record.from, record.subject);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod folder;
pub mod memory;
mod record;
mod store;

pub use client::{StoreClient, StoreConfig};
pub use error::{Error, Result};
pub use folder::{Folder, PartitionKey};
pub use memory::{MemoryStore, Operation};
pub use record::{MessageRecord, NewMessage, RemoteFolder, normalize, sort_newest_first};
pub use store::MailStore;
