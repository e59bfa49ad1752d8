//! Sample Reader API payloads

use serde_json::{json, Value};

/// A `results` entry with every field the server sends
pub fn sample_document() -> Value {
    json!({
        "id": "01gwfvp9pyaabcdgmx14f6ha0",
        "url": "https://read.readwise.io/new/read/01gwfvp9pyaabcdgmx14f6ha0",
        "source_url": "https://www.example.com/posts/ownership",
        "title": "Understanding Ownership",
        "author": "Ferris Crab",
        "source": "Reader RSS",
        "category": "article",
        "location": "later",
        "tags": {"rust": {"name": "rust", "type": "manual", "created": 1680000000000u64}},
        "site_name": "Example Blog",
        "word_count": 2412,
        "notes": "Reread the borrowing section",
        "published_date": "2023-03-29",
        "summary": "A walk through moves, borrows and lifetimes.",
        "html_content": "<p>Ownership is Rust's most unique feature.</p>",
        "image_url": "https://www.example.com/cover.png",
        "parent_id": null,
        "reading_progress": 0.35,
        "first_opened_at": "2023-03-30T08:00:00.000000+00:00",
        "last_opened_at": "2023-04-01T21:12:45.000000+00:00",
        "created_at": "2023-03-29T17:37:41.156000+00:00",
        "updated_at": "2023-04-01T21:12:45.338000+00:00",
        "saved_at": "2023-03-29T17:37:41.000000+00:00",
        "last_moved_at": "2023-03-31T09:00:00.000000+00:00"
    })
}

/// A `results` entry with only the identifying fields
pub fn minimal_document(id: &str) -> Value {
    json!({
        "id": id,
        "url": format!("https://read.readwise.io/read/{}", id)
    })
}

/// A `GET /list/` body
pub fn list_page(results: Vec<Value>, next_page_cursor: Option<&str>) -> Value {
    json!({
        "count": results.len(),
        "nextPageCursor": next_page_cursor,
        "results": results
    })
}
