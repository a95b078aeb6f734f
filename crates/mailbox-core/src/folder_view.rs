//! In-memory view of one folder.
//!
//! A [`FolderView`] owns the records of one folder for one session. It only
//! changes local state after the store has confirmed a mutation, so the list
//! never shows something the store rejected.

use mailbox_store::{Folder, MailStore, MessageRecord, sort_newest_first};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::session::Session;

/// Lifecycle of a folder view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// A fetch is pending (initial state, and during a refresh).
    Loading,
    /// Loaded with at least one record.
    Ready,
    /// Loaded, nothing to show.
    Empty,
}

/// Records of one folder plus derived state.
#[derive(Debug)]
pub struct FolderView<S> {
    store: S,
    session: Session,
    folder: Folder,
    records: Vec<MessageRecord>,
    loading: bool,
}

impl<S: MailStore> FolderView<S> {
    /// Creates a view in the [`LoadState::Loading`] state. Call [`Self::load`] next.
    #[must_use]
    pub const fn new(store: S, session: Session, folder: Folder) -> Self {
        Self {
            store,
            session,
            folder,
            records: Vec::new(),
            loading: true,
        }
    }

    /// Folder shown by this view.
    #[must_use]
    pub const fn folder(&self) -> Folder {
        self.folder
    }

    /// Session this view acts for.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        if self.loading {
            LoadState::Loading
        } else if self.records.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Ready
        }
    }

    /// Records, newest first.
    #[must_use]
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MessageRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Number of unread records, counted on every call.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|record| !record.read).count()
    }

    /// Fetch the folder and replace the local list.
    ///
    /// A failed fetch is logged and leaves an empty list; there is nothing
    /// better to show than "no mail yet". Use [`Self::try_load`] when the
    /// caller must tell a store failure apart from an empty folder.
    pub async fn load(&mut self) {
        if let Err(e) = self.try_load().await {
            error!("Failed to load {} for {}: {e}", self.folder, self.session.email);
        }
    }

    /// Fetch the folder and replace the local list, returning the store error.
    ///
    /// On failure the list is left empty, as with [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns the store error when the folder cannot be listed.
    pub async fn try_load(&mut self) -> Result<()> {
        self.loading = true;
        let user = self.session.partition_key();
        let listed = self.store.list(&user, self.folder).await;
        self.loading = false;

        match listed {
            Ok(mut records) => {
                sort_newest_first(&mut records);
                debug!("Loaded {} records from {}", records.len(), self.folder);
                self.records = records;
                Ok(())
            }
            Err(e) => {
                self.records.clear();
                Err(e.into())
            }
        }
    }

    /// Explicit refresh; passes through [`LoadState::Loading`] again.
    pub async fn refresh(&mut self) {
        self.load().await;
    }

    /// Mark a record read.
    ///
    /// Does nothing when it is already read. Otherwise the flag is patched in
    /// the store and flipped locally only once the store has accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageNotFound`] for an unknown id, or the store error.
    pub async fn mark_read(&mut self, id: &str) -> Result<()> {
        let record = self
            .get(id)
            .ok_or_else(|| Error::MessageNotFound(id.to_string()))?;
        if record.read {
            return Ok(());
        }

        self.store
            .set_read(&self.session.partition_key(), self.folder, id, true)
            .await?;

        if let Some(record) = self.records.iter_mut().find(|record| record.id == id) {
            record.read = true;
        }
        Ok(())
    }

    /// Open a record for reading: marks it read and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageNotFound`] for an unknown id, or the store error.
    pub async fn open(&mut self, id: &str) -> Result<MessageRecord> {
        self.mark_read(id).await?;
        self.get(id)
            .cloned()
            .ok_or_else(|| Error::MessageNotFound(id.to_string()))
    }

    /// Delete a record. The caller has already asked the user to confirm.
    ///
    /// The record leaves the local list only after the store confirms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageNotFound`] for an unknown id, or the store
    /// error, in which case the record stays.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::MessageNotFound(id.to_string()));
        }

        self.store
            .delete(&self.session.partition_key(), self.folder, id)
            .await?;

        self.records.retain(|record| record.id != id);
        debug!("Deleted {id} from {}", self.folder);
        Ok(())
    }
}

/// Counts for one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderSummary {
    /// Folder counted.
    pub folder: Folder,
    /// All records.
    pub total: usize,
    /// Unread records.
    pub unread: usize,
}

/// Both folders of one session, loaded together.
#[derive(Debug)]
pub struct Mailbox<S> {
    /// Received mail.
    pub inbox: FolderView<S>,
    /// Sent mail.
    pub sent: FolderView<S>,
}

impl<S: MailStore + Clone> Mailbox<S> {
    /// Load inbox and sent with two concurrent requests.
    pub async fn load(store: &S, session: &Session) -> Self {
        let [mut inbox, mut sent] =
            Folder::ALL.map(|folder| FolderView::new(store.clone(), session.clone(), folder));
        tokio::join!(inbox.load(), sent.load());
        Self { inbox, sent }
    }

    /// Totals and unread counts, inbox first.
    #[must_use]
    pub fn summary(&self) -> [FolderSummary; 2] {
        [&self.inbox, &self.sent].map(|view| FolderSummary {
            folder: view.folder(),
            total: view.records().len(),
            unread: view.unread_count(),
        })
    }
}

/// Load both folders of a session and report their counts.
pub async fn load_counts<S: MailStore + Clone>(store: &S, session: &Session) -> [FolderSummary; 2] {
    Mailbox::load(store, session).await.summary()
}
