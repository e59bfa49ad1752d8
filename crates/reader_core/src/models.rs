//! Typed records for Reader list responses
//!
//! Upstream JSON is converted here, at the boundary. Nothing past this
//! module handles untyped maps.

use reader_common::{ReaderError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Title used when the upstream document has none
pub const UNTITLED: &str = "Untitled";

/// One document saved in Reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    pub url: String,

    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient")]
    pub source_url: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<String>,

    /// article, email, rss, highlight, note, pdf, epub, tweet or video
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,

    /// Workflow bucket the document is in
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub tags: Map<String, Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub site_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_count")]
    pub word_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient")]
    pub notes: Option<String>,

    /// Sent either as a date string or as epoch milliseconds
    #[serde(default, deserialize_with = "string_or_number")]
    pub published_date: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,

    /// Only present when the list was requested with HTML content
    #[serde(default, deserialize_with = "lenient")]
    pub html_content: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,

    /// Set on highlights and notes, points at the owning document
    #[serde(default, deserialize_with = "lenient")]
    pub parent_id: Option<String>,

    /// Fraction read, 0.0 to 1.0
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub reading_progress: f64,

    // Timestamps are kept as sent (ISO-8601)
    #[serde(default, deserialize_with = "lenient")]
    pub first_opened_at: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub last_opened_at: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub saved_at: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub last_moved_at: Option<String>,
}

fn default_title() -> String {
    UNTITLED.to_string()
}

fn title_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_else(default_title))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON value; one of the wrong type becomes `None` with a warning
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Ignoring malformed document field {}: {}", value, e);
                None
            }
        },
    })
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Identifiers sometimes arrive as numbers
fn string_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(deserializer)?.unwrap_or_default())
}

/// Counts may be sent as integral floats (`1200.0`)
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) if n.as_u64().is_some() => n.as_u64(),
        Some(Value::Number(n))
            if n.as_f64().is_some_and(|f| f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64) =>
        {
            n.as_f64().map(|f| f as u64)
        }
        Some(other) => {
            tracing::warn!("Ignoring malformed document count {}", other);
            None
        }
    })
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        None | Some(Value::Null) => None,
        Some(other) => {
            tracing::warn!("Ignoring malformed document field {}", other);
            None
        }
    })
}

impl DocumentRecord {
    /// Build a record from one upstream `results` entry
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ReaderError::InvalidResponse(format!("malformed document: {}", e)))
    }
}

/// One page of the document list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Server-reported total, may exceed `results.len()`
    #[serde(default)]
    pub count: u64,

    /// Documents in server order
    #[serde(default, deserialize_with = "documents")]
    pub results: Vec<DocumentRecord>,

    #[serde(default, rename = "nextPageCursor", deserialize_with = "lenient")]
    pub next_page_cursor: Option<String>,
}

/// Entries that are not document objects are dropped with a warning
fn documents<'de, D>(deserializer: D) -> std::result::Result<Vec<DocumentRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<Value> = null_as_default(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match DocumentRecord::from_value(entry) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Dropping document #{} from list: {}", i, e);
                None
            }
        })
        .collect())
}

impl ListResponse {
    /// Convert the untyped body of `GET /list/`
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ReaderError::InvalidResponse(
                "expected a JSON object for the document list".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ReaderError::InvalidResponse(format!("malformed document list: {}", e)))
    }

    pub fn has_more(&self) -> bool {
        self.next_page_cursor.is_some()
    }
}
