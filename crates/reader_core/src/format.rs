//! Plain-text rendering of list results for text output mode

use crate::models::{DocumentRecord, ListResponse};
use chrono::{DateTime, Utc};
use reader_common::ReaderError;
use std::fmt::Write;

/// Render a page of documents as a human-readable summary
pub fn render_list(list: &ListResponse) -> String {
    let mut out = String::new();

    if list.results.is_empty() {
        let _ = writeln!(out, "No documents found (total: {}).", list.count);
    } else {
        let _ = writeln!(
            out,
            "Found {} documents (showing {}).",
            list.count,
            list.results.len()
        );
    }

    for (i, doc) in list.results.iter().enumerate() {
        out.push('\n');
        render_document(&mut out, i + 1, doc);
    }

    if let Some(cursor) = &list.next_page_cursor {
        let _ = write!(out, "\nMore documents available. Next page cursor: {}\n", cursor);
    }

    out
}

fn render_document(out: &mut String, index: usize, doc: &DocumentRecord) {
    let _ = writeln!(out, "{}. {}", index, doc.title);
    line(out, "Author", doc.author.as_deref());
    line(out, "Category", doc.category.as_deref());
    line(out, "Location", doc.location.as_deref());
    line(out, "Word count", doc.word_count.map(|n| n.to_string()).as_deref());
    line(out, "Published", doc.published_date.as_deref().map(published).as_deref());
    line(out, "Saved", doc.saved_at.as_deref().map(timestamp).as_deref());
    line(out, "Updated", doc.updated_at.as_deref().map(timestamp).as_deref());
    if doc.reading_progress > 0.0 {
        let _ = writeln!(out, "   Progress: {:.0}%", doc.reading_progress * 100.0);
    }
    line(out, "URL", Some(doc.url.as_str()).filter(|u| !u.is_empty()));
    line(out, "Source URL", doc.source_url.as_deref());
}

fn line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "   {}: {}", label, value);
    }
}

/// RFC 3339 timestamps become `YYYY-MM-DD HH:MM UTC`, anything else is kept
fn timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Published dates arrive as epoch milliseconds or as date strings
fn published(raw: &str) -> String {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Error text returned in place of a result
pub fn render_error(err: &ReaderError) -> String {
    format!("Error: {}", err)
}
