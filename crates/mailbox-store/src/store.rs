//! The operations every mail store offers.

use std::future::Future;

use crate::error::Result;
use crate::folder::{Folder, PartitionKey};
use crate::record::{MessageRecord, NewMessage};

/// A key-value document store holding message records per user and folder.
///
/// Every mutating call either fully succeeds or returns an error; callers
/// must not apply local effects until the call has returned `Ok`.
pub trait MailStore {
    /// Current records of a folder, normalized but unsorted.
    ///
    /// An absent folder yields an empty list.
    fn list(
        &self,
        user: &PartitionKey,
        folder: Folder,
    ) -> impl Future<Output = Result<Vec<MessageRecord>>> + Send;

    /// Append a record and return the identifier the store assigned to it.
    fn create(
        &self,
        user: &PartitionKey,
        folder: Folder,
        message: &NewMessage,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Patch the read flag of one record.
    fn set_read(
        &self,
        user: &PartitionKey,
        folder: Folder,
        id: &str,
        read: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove one record.
    fn delete(
        &self,
        user: &PartitionKey,
        folder: Folder,
        id: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
