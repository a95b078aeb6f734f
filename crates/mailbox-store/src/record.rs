//! Message records and normalization of remote folder shapes.
//!
//! The store returns a folder as either nothing, an ordered sequence, or a
//! mapping from generated keys to records. [`RemoteFolder`] names those three
//! shapes and [`normalize`] turns any of them into the same list of
//! [`MessageRecord`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// A message as seen in one folder of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Identifier, unique within the folder.
    pub id: String,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line, possibly empty.
    pub subject: String,
    /// Rich-text (HTML) body.
    pub message: String,
    /// Creation time as an ISO-8601 string.
    pub timestamp: Option<String>,
    /// Whether the message has been read.
    pub read: bool,
}

impl MessageRecord {
    /// Milliseconds since the epoch, or zero when the timestamp is missing or unparseable.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.as_deref().and_then(parse_timestamp).unwrap_or(0)
    }
}

/// Payload written to the store when a message is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Rich-text (HTML) body.
    pub message: String,
    /// Creation time, RFC 3339 in UTC with milliseconds.
    pub timestamp: String,
    /// Read flag for this copy.
    pub read: bool,
}

impl NewMessage {
    /// Creates an unread message stamped with the current time.
    #[must_use]
    pub fn now(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            read: false,
        }
    }

    /// Sets the read flag.
    #[must_use]
    pub const fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// The record this payload becomes once the store assigns it an id.
    #[must_use]
    pub fn into_record(self, id: impl Into<String>) -> MessageRecord {
        MessageRecord {
            id: id.into(),
            from: self.from,
            to: self.to,
            subject: self.subject,
            message: self.message,
            timestamp: Some(self.timestamp),
            read: self.read,
        }
    }
}

/// Raw shape of a folder as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFolder {
    /// No folder yet (null body).
    Absent,
    /// Ordered sequence; entries may be null.
    Sequence(Vec<Value>),
    /// Generated key to record.
    Mapping(Map<String, Value>),
}

impl RemoteFolder {
    /// Classify a decoded response body.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(entries) => Self::Mapping(entries),
            Value::Null => Self::Absent,
            other => {
                debug!("Ignoring scalar folder body: {other}");
                Self::Absent
            }
        }
    }
}

/// Normalize a remote folder into records.
///
/// The record's own `id` wins; otherwise the sequence index or mapping key is
/// used. A missing `read` flag takes `default_read`. Null entries and entries
/// that are not objects are dropped.
#[must_use]
pub fn normalize(folder: RemoteFolder, default_read: bool) -> Vec<MessageRecord> {
    match folder {
        RemoteFolder::Absent => Vec::new(),
        RemoteFolder::Sequence(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| record_from_value(index.to_string(), value, default_read))
            .collect(),
        RemoteFolder::Mapping(entries) => entries
            .into_iter()
            .filter_map(|(key, value)| record_from_value(key, value, default_read))
            .collect(),
    }
}

/// Sort records newest first.
///
/// The sort is stable, and records without a usable timestamp sort as the oldest.
pub fn sort_newest_first(records: &mut [MessageRecord]) {
    records.sort_by_key(|record| std::cmp::Reverse(record.timestamp_millis()));
}

fn record_from_value(fallback_id: String, value: Value, default_read: bool) -> Option<MessageRecord> {
    let Value::Object(fields) = value else {
        return None;
    };

    let field = |name: &str| fields.get(name).and_then(as_text);

    Some(MessageRecord {
        id: field("id").unwrap_or(fallback_id),
        from: field("from").unwrap_or_default(),
        to: field("to").unwrap_or_default(),
        subject: field("subject").unwrap_or_default(),
        message: field("message").unwrap_or_default(),
        timestamp: field("timestamp"),
        read: fields
            .get("read")
            .and_then(Value::as_bool)
            .unwrap_or(default_read),
    })
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp_millis());
    }
    // Zone-less forms are taken as UTC.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::needless_collect)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, timestamp: Option<&str>) -> MessageRecord {
        MessageRecord {
            id: id.to_string(),
            from: String::new(),
            to: String::new(),
            subject: String::new(),
            message: String::new(),
            timestamp: timestamp.map(str::to_string),
            read: false,
        }
    }

    #[test]
    fn test_normalize_null() {
        let folder = RemoteFolder::from_value(Value::Null);
        assert_eq!(folder, RemoteFolder::Absent);
        assert!(normalize(folder, false).is_empty());
    }

    #[test]
    fn test_normalize_mapping_uses_keys() {
        let value = json!({
            "a": {"from": "x@y.com", "subject": "one"},
            "b": {"from": "x@y.com", "subject": "two", "read": true},
        });
        let records = normalize(RemoteFolder::from_value(value), false);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert!(!records[0].read);
        assert_eq!(records[1].id, "b");
        assert!(records[1].read);
    }

    #[test]
    fn test_normalize_sequence_uses_index_and_skips_holes() {
        let value = json!([null, {"subject": "first"}, {"id": "kept", "subject": "second"}]);
        let records = normalize(RemoteFolder::from_value(value), true);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "kept"]);
        assert!(records.iter().all(|r| r.read));
    }

    #[test]
    fn test_normalize_stored_id_wins_over_key() {
        let value = json!({"-key": {"id": 42, "subject": "numbered"}});
        let records = normalize(RemoteFolder::from_value(value), false);
        assert_eq!(records[0].id, "42");
    }

    #[test]
    fn test_normalize_skips_non_objects() {
        let value = json!({"a": "junk", "b": {"subject": "ok"}});
        let records = normalize(RemoteFolder::from_value(value), false);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "b");
    }

    #[test]
    fn test_scalar_body_is_absent() {
        assert_eq!(RemoteFolder::from_value(json!(7)), RemoteFolder::Absent);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record("old", Some("2024-01-01T00:00:00.000Z")),
            record("missing", None),
            record("new", Some("2024-03-01T10:00:00.000Z")),
            record("garbage", Some("not a date")),
            record("mid", Some("2024-02-01T00:00:00+02:00")),
        ];
        sort_newest_first(&mut records);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old", "missing", "garbage"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let mut records = vec![
            record("first", Some("2024-01-01T00:00:00Z")),
            record("second", Some("2024-01-01T00:00:00Z")),
        ];
        sort_newest_first(&mut records);
        assert_eq!(records[0].id, "first");
        assert_eq!(records[1].id, "second");
    }

    #[test]
    fn test_timestamp_forms() {
        assert_eq!(record("a", Some("1970-01-01T00:00:01.000Z")).timestamp_millis(), 1000);
        assert_eq!(record("b", Some("1970-01-02")).timestamp_millis(), 86_400_000);
        assert_eq!(record("c", Some("1970-01-01T00:00:02")).timestamp_millis(), 2000);
        assert_eq!(record("d", None).timestamp_millis(), 0);
    }

    #[test]
    fn test_new_message_into_record() {
        let message = NewMessage::now("a@x.com", "b@y.com", "Hi", "<p>hello</p>").with_read(true);
        assert!(message.timestamp.ends_with('Z'));

        let record = message.clone().into_record("-k1");
        assert_eq!(record.id, "-k1");
        assert_eq!(record.timestamp.as_deref(), Some(message.timestamp.as_str()));
        assert!(record.read);
        assert!(record.timestamp_millis() > 0);
    }
}
