//! In-process store with the same semantics as the hosted one.
//!
//! Folders are kept as raw JSON subtrees so that listing goes through the
//! same normalization as responses from the network. Individual operations
//! can be made to fail, and every call is counted.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::folder::{Folder, PartitionKey};
use crate::record::{MessageRecord, NewMessage, RemoteFolder, normalize};
use crate::store::MailStore;

/// A store operation, for failure injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Reading a folder.
    List,
    /// Appending a record.
    Create,
    /// Patching a read flag.
    SetRead,
    /// Removing a record.
    Delete,
}

#[derive(Debug, Default)]
struct State {
    folders: HashMap<(PartitionKey, Folder), Value>,
    failing: HashSet<(Operation, Option<Folder>)>,
    calls: Vec<(Operation, Folder)>,
    next_key: u64,
}

impl State {
    fn begin(&mut self, operation: Operation, folder: Folder) -> Result<()> {
        self.calls.push((operation, folder));
        if self.failing.contains(&(operation, None))
            || self.failing.contains(&(operation, Some(folder)))
        {
            return Err(Error::status(503, "injected failure"));
        }
        Ok(())
    }
}

/// Shared in-memory [`MailStore`]. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace a folder's raw contents, in any shape the store may hold.
    pub fn seed(&self, user: &PartitionKey, folder: Folder, contents: Value) {
        self.state().folders.insert((user.clone(), folder), contents);
    }

    /// Raw contents of a folder (`null` when it does not exist).
    #[must_use]
    pub fn raw(&self, user: &PartitionKey, folder: Folder) -> Value {
        self.state()
            .folders
            .get(&(user.clone(), folder))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Make every call of `operation` fail.
    pub fn fail(&self, operation: Operation) {
        self.state().failing.insert((operation, None));
    }

    /// Make calls of `operation` against `folder` fail.
    pub fn fail_in(&self, operation: Operation, folder: Folder) {
        self.state().failing.insert((operation, Some(folder)));
    }

    /// Stop injecting failures.
    pub fn recover(&self) {
        self.state().failing.clear();
    }

    /// Number of calls made so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.state().calls.len()
    }

    /// Number of calls of one operation made so far.
    #[must_use]
    pub fn calls_of(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }
}

/// Turn any folder subtree into a keyed mapping, as a push onto it would.
fn as_mapping(contents: &mut Value) -> Option<&mut Map<String, Value>> {
    if let Value::Array(items) = contents {
        let keyed = std::mem::take(items)
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(index, item)| (index.to_string(), item))
            .collect();
        *contents = Value::Object(keyed);
    } else if !contents.is_object() {
        *contents = Value::Object(Map::new());
    }
    contents.as_object_mut()
}

impl MailStore for MemoryStore {
    async fn list(&self, user: &PartitionKey, folder: Folder) -> Result<Vec<MessageRecord>> {
        let contents = {
            let mut state = self.state();
            state.begin(Operation::List, folder)?;
            state
                .folders
                .get(&(user.clone(), folder))
                .cloned()
                .unwrap_or(Value::Null)
        };
        Ok(normalize(RemoteFolder::from_value(contents), folder.default_read()))
    }

    async fn create(
        &self,
        user: &PartitionKey,
        folder: Folder,
        message: &NewMessage,
    ) -> Result<String> {
        let record = serde_json::to_value(message)?;
        let mut state = self.state();
        state.begin(Operation::Create, folder)?;

        let key = format!("-M{:08}", state.next_key);
        state.next_key += 1;

        let contents = state
            .folders
            .entry((user.clone(), folder))
            .or_insert(Value::Null);
        if let Some(entries) = as_mapping(contents) {
            entries.insert(key.clone(), record);
        }
        Ok(key)
    }

    async fn set_read(
        &self,
        user: &PartitionKey,
        folder: Folder,
        id: &str,
        read: bool,
    ) -> Result<()> {
        let mut state = self.state();
        state.begin(Operation::SetRead, folder)?;

        let contents = state
            .folders
            .entry((user.clone(), folder))
            .or_insert(Value::Null);
        // A patch on a missing path creates it, as the hosted store does.
        if let Some(entries) = as_mapping(contents) {
            let record = entries
                .entry(id.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(fields) = record {
                fields.insert("read".to_string(), Value::Bool(read));
            } else {
                *record = serde_json::json!({ "read": read });
            }
        }
        Ok(())
    }

    async fn delete(&self, user: &PartitionKey, folder: Folder, id: &str) -> Result<()> {
        let mut state = self.state();
        state.begin(Operation::Delete, folder)?;

        if let Some(entries) = state
            .folders
            .get_mut(&(user.clone(), folder))
            .and_then(as_mapping)
        {
            entries.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> PartitionKey {
        PartitionKey::from_email("alice@example.com")
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = MemoryStore::new();
        let message = NewMessage::now("alice@example.com", "bob@example.com", "Hi", "<p>x</p>");

        let id = store.create(&alice(), Folder::Sent, &message).await.unwrap();
        let records = store.list(&alice(), Folder::Sent).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].subject, "Hi");
        assert!(store.list(&alice(), Folder::Inbox).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_keys_are_unique() {
        let store = MemoryStore::new();
        let message = NewMessage::now("a@x.com", "b@y.com", "s", "m");
        let first = store.create(&alice(), Folder::Inbox, &message).await.unwrap();
        let second = store.create(&alice(), Folder::Inbox, &message).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_set_read_and_delete() {
        let store = MemoryStore::new();
        store.seed(&alice(), Folder::Inbox, json!({"k1": {"subject": "a"}, "k2": {"subject": "b"}}));

        store.set_read(&alice(), Folder::Inbox, "k1", true).await.unwrap();
        store.delete(&alice(), Folder::Inbox, "k2").await.unwrap();

        let records = store.list(&alice(), Folder::Inbox).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "k1");
        assert!(records[0].read);
    }

    #[tokio::test]
    async fn test_push_onto_sequence_keeps_entries() {
        let store = MemoryStore::new();
        store.seed(&alice(), Folder::Inbox, json!([null, {"subject": "old"}]));
        let message = NewMessage::now("a@x.com", "b@y.com", "new", "m");
        store.create(&alice(), Folder::Inbox, &message).await.unwrap();

        let raw = store.raw(&alice(), Folder::Inbox);
        assert_eq!(raw["1"]["subject"], "old");
        assert_eq!(store.list(&alice(), Folder::Inbox).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_contents() {
        let store = MemoryStore::new();
        store.seed(&alice(), Folder::Inbox, json!({"k1": {"subject": "a"}}));
        store.fail(Operation::Delete);

        let result = store.delete(&alice(), Folder::Inbox, "k1").await;
        assert!(matches!(result, Err(Error::Status { status: 503, .. })));
        assert_eq!(store.list(&alice(), Folder::Inbox).await.unwrap().len(), 1);

        store.recover();
        store.delete(&alice(), Folder::Inbox, "k1").await.unwrap();
        assert!(store.list(&alice(), Folder::Inbox).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_scoped_to_folder() {
        let store = MemoryStore::new();
        store.fail_in(Operation::Create, Folder::Inbox);
        let message = NewMessage::now("a@x.com", "b@y.com", "s", "m");

        assert!(store.create(&alice(), Folder::Inbox, &message).await.is_err());
        assert!(store.create(&alice(), Folder::Sent, &message).await.is_ok());
        assert_eq!(store.calls_of(Operation::Create), 2);
        assert_eq!(store.calls(), 2);
    }
}
