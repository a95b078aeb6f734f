//! Compose and send.
//!
//! Sending writes the same message twice: a read copy into the sender's
//! `sent` folder and an unread copy into the recipient's `inbox`. Both writes
//! run concurrently. When exactly one of them lands, that copy is deleted
//! again so the two folders stay consistent.

use mailbox_store::{Folder, MailStore, MessageRecord, NewMessage, PartitionKey};
use tracing::{debug, error, info, warn};

use crate::session::Session;

/// A message being written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Rich-text (HTML) body.
    pub message: String,
}

/// A required field of a [`Draft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Recipient.
    To,
    /// Subject.
    Subject,
    /// Body.
    Message,
}

impl DraftField {
    /// Field name as shown to the user.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::To => "to",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for DraftField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Draft {
    /// Creates a draft.
    #[must_use]
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Fields that are empty after trimming, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<DraftField> {
        [
            (DraftField::To, &self.to),
            (DraftField::Subject, &self.subject),
            (DraftField::Message, &self.message),
        ]
        .into_iter()
        // Whitespace-only counts as missing, so a subject of "  " is rejected.
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Where a one-sided write ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialWrite {
    /// Folder whose write succeeded.
    pub written: Folder,
    /// Whether the successful copy was deleted again.
    pub rolled_back: bool,
}

/// Errors from [`send_mail`]. Every variant reads as a failed send.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Nobody is logged in.
    #[error("Failed to send mail: not logged in")]
    NoSender,

    /// Required fields are empty.
    #[error("Failed to send mail: missing {}", join_fields(.0))]
    MissingFields(Vec<DraftField>),

    /// The store refused at least one write.
    #[error("Failed to send mail")]
    Failed {
        /// First store error observed.
        #[source]
        source: mailbox_store::Error,
        /// Set when the other write succeeded.
        partial: Option<PartialWrite>,
    },
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ids assigned to a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// The sender's copy as stored in `sent`.
    pub message: MessageRecord,
    /// Id of the copy in the sender's `sent`.
    pub sent_id: String,
    /// Id of the copy in the recipient's `inbox`.
    pub inbox_id: String,
}

/// Send a draft from the logged-in user.
///
/// Fields are checked first, then the sender; either failure returns before
/// the store is touched. Both copies share one timestamp. There is no retry.
///
/// # Errors
///
/// Returns [`SendError::MissingFields`], [`SendError::NoSender`], or
/// [`SendError::Failed`] when either write fails.
pub async fn send_mail<S: MailStore>(
    store: &S,
    sender: Option<&Session>,
    draft: &Draft,
) -> Result<SendReceipt, SendError> {
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        return Err(SendError::MissingFields(missing));
    }
    let sender = sender.ok_or(SendError::NoSender)?;

    let to = draft.to.trim();
    let sender_key = sender.partition_key();
    let recipient_key = PartitionKey::from_email(to);

    let message = NewMessage::now(
        sender.email.as_str(),
        to,
        draft.subject.as_str(),
        draft.message.as_str(),
    );
    let sent_copy = message.clone().with_read(true);
    let inbox_copy = message.with_read(false);

    debug!("Sending mail from {} to {to}", sender.email);
    let (sent, inbox) = tokio::join!(
        store.create(&sender_key, Folder::Sent, &sent_copy),
        store.create(&recipient_key, Folder::Inbox, &inbox_copy),
    );

    match (sent, inbox) {
        (Ok(sent_id), Ok(inbox_id)) => {
            info!("Mail sent from {} to {to}", sender.email);
            Ok(SendReceipt {
                message: sent_copy.into_record(sent_id.clone()),
                sent_id,
                inbox_id,
            })
        }
        (Ok(sent_id), Err(source)) => {
            let rolled_back = compensate(store, &sender_key, Folder::Sent, &sent_id).await;
            Err(SendError::Failed {
                source,
                partial: Some(PartialWrite {
                    written: Folder::Sent,
                    rolled_back,
                }),
            })
        }
        (Err(source), Ok(inbox_id)) => {
            let rolled_back = compensate(store, &recipient_key, Folder::Inbox, &inbox_id).await;
            Err(SendError::Failed {
                source,
                partial: Some(PartialWrite {
                    written: Folder::Inbox,
                    rolled_back,
                }),
            })
        }
        (Err(source), Err(other)) => {
            warn!("Both writes failed: {source}; {other}");
            Err(SendError::Failed {
                source,
                partial: None,
            })
        }
    }
}

/// Delete the copy that made it. Returns whether the delete succeeded.
async fn compensate<S: MailStore>(
    store: &S,
    user: &PartitionKey,
    folder: Folder,
    id: &str,
) -> bool {
    warn!("Send only reached {folder} of {user}, removing {id}");
    match store.delete(user, folder, id).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to remove {id} from {folder} of {user}: {e}");
            false
        }
    }
}
