//! Plain-text rendering of folders and messages.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use mailbox_core::FolderSummary;
use mailbox_store::{Folder, MessageRecord};

/// Convert an HTML body to Markdown, falling back to the raw markup.
pub fn body_text(html: &str) -> String {
    htmd::convert(html).unwrap_or_else(|e| {
        tracing::debug!("HTML conversion failed: {e}");
        html.to_string()
    })
}

/// Local date and time of a record, or `-` when it has none.
pub fn format_date(record: &MessageRecord) -> String {
    match record.timestamp_millis() {
        0 => "-".to_string(),
        millis => DateTime::from_timestamp_millis(millis).map_or_else(
            || "-".to_string(),
            |utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        ),
    }
}

/// Who the other party is: the sender for received mail, the recipient for sent mail.
fn correspondent(record: &MessageRecord, folder: Folder) -> &str {
    match folder {
        Folder::Inbox => record.from.as_str(),
        Folder::Sent => record.to.as_str(),
    }
}

/// One listing line per record; unread records are marked with `*`.
pub fn folder_listing(folder: Folder, records: &[MessageRecord]) -> String {
    if records.is_empty() {
        return format!("No mail in {folder}.\n");
    }

    let mut out = String::new();
    for record in records {
        let marker = if record.read { ' ' } else { '*' };
        let subject = if record.subject.is_empty() {
            "(no subject)"
        } else {
            record.subject.as_str()
        };
        let _ = writeln!(
            out,
            "{marker} {:<20} {:<16} {:<28} {subject}",
            record.id,
            format_date(record),
            correspondent(record, folder),
        );
    }
    out
}

/// Header block followed by the converted body.
pub fn message_view(record: &MessageRecord) -> String {
    format!(
        "From:    {}\nTo:      {}\nDate:    {}\nSubject: {}\n\n{}\n",
        record.from,
        record.to,
        format_date(record),
        record.subject,
        body_text(&record.message),
    )
}

/// Counts for both folders.
pub fn summary(counts: &[FolderSummary]) -> String {
    counts
        .iter()
        .map(|c| format!("{:<6} {} messages, {} unread\n", c.folder.as_str(), c.total, c.unread))
        .collect()
}
