//! Folder names and user partition keys.

use serde::{Deserialize, Serialize};

/// A named partition of message records under one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    /// Messages received by the user.
    Inbox,
    /// Copies of messages the user sent.
    Sent,
}

impl Folder {
    /// Every folder, in display order.
    pub const ALL: [Self; 2] = [Self::Inbox, Self::Sent];

    /// Path segment used by the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
        }
    }

    /// Read flag assumed for records that do not carry one.
    #[must_use]
    pub const fn default_read(self) -> bool {
        match self {
            Self::Inbox => false,
            Self::Sent => true,
        }
    }

    /// Parse a folder from its path name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "inbox" => Some(Self::Inbox),
            "sent" => Some(Self::Sent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Folder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key addressing one user's subtree in the store.
///
/// Derived from the email address by replacing every `.` with `_`, since the
/// store forbids `.` in path segments. It is never mapped back to an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Derive the partition key for an email address.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        Self(email.replace('.', "_"))
    }

    /// The key as a path segment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_key_replaces_every_dot() {
        let key = PartitionKey::from_email("first.last@mail.example.com");
        assert_eq!(key.as_str(), "first_last@mail_example_com");
    }

    #[test]
    fn test_partition_key_without_dots() {
        assert_eq!(PartitionKey::from_email("root@localhost").as_str(), "root@localhost");
    }

    #[test]
    fn test_folder_defaults() {
        assert!(!Folder::Inbox.default_read());
        assert!(Folder::Sent.default_read());
        assert_eq!(Folder::Inbox.as_str(), "inbox");
        assert_eq!(Folder::Sent.to_string(), "sent");
    }

    #[test]
    fn test_folder_from_name() {
        assert_eq!(Folder::from_name("INBOX"), Some(Folder::Inbox));
        assert_eq!(Folder::from_name(" sent "), Some(Folder::Sent));
        assert_eq!(Folder::from_name("trash"), None);
    }
}
