//! Filter validation for `GET /list/`
//!
//! Invalid filters are dropped with a warning instead of failing the call,
//! so callers that send a partly wrong filter set still get documents.

use reader_common::{ReaderError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Workflow bucket a document resides in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    New,
    Later,
    Shortlist,
    Archive,
    Feed,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::New,
        Location::Later,
        Location::Shortlist,
        Location::Archive,
        Location::Feed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::New => "new",
            Location::Later => "later",
            Location::Shortlist => "shortlist",
            Location::Archive => "archive",
            Location::Feed => "feed",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = ReaderError;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self> {
        Location::ALL
            .into_iter()
            .find(|loc| loc.as_str() == s)
            .ok_or_else(|| ReaderError::ValidationError(format!("Invalid location: '{}'", s)))
    }
}

/// Query parameters accepted by the list endpoint, already validated.
///
/// Serializes with the upstream parameter names and skips unset fields, so it
/// can be handed straight to `RequestBuilder::query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_after: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub with_html_content: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<String>,
}

impl ListQuery {
    /// Keep only the filters that pass validation
    pub fn validated(
        location: Option<&str>,
        updated_after: Option<&str>,
        with_content: bool,
        page_cursor: Option<&str>,
    ) -> Self {
        let location = location.and_then(|raw| match raw.parse::<Location>() {
            Ok(loc) => Some(loc),
            Err(_) => {
                tracing::warn!("Invalid `location`: '{}', parameter will be ignored", raw);
                None
            }
        });

        let updated_after = updated_after.filter(|s| !s.is_empty()).and_then(|raw| {
            if is_iso_datetime_with_zone(raw) {
                Some(raw.to_string())
            } else {
                tracing::warn!("Invalid ISO 8601 datetime: '{}', parameter will be ignored", raw);
                None
            }
        });

        let page_cursor = page_cursor
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            location,
            updated_after,
            with_html_content: with_content,
            page_cursor,
        }
    }

    /// Same as [`ListQuery::validated`] for loosely-typed JSON arguments.
    ///
    /// Values of the wrong JSON type are dropped with a warning.
    pub fn from_json_args(
        location: Option<&Value>,
        updated_after: Option<&Value>,
        with_content: Option<&Value>,
        page_cursor: Option<&Value>,
    ) -> Self {
        let location = string_arg("location", location);
        let updated_after = string_arg("updatedAfter", updated_after);
        let page_cursor = string_arg("pageCursor", page_cursor);
        let with_content = with_content.map(is_truthy).unwrap_or(false);

        Self::validated(
            location.as_deref(),
            updated_after.as_deref(),
            with_content,
            page_cursor.as_deref(),
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Loose ISO-8601 check: a `T` separator and either a `Z` suffix or a `+` offset.
///
/// Not full RFC 3339 validation; negative offsets are rejected.
pub fn is_iso_datetime_with_zone(value: &str) -> bool {
    value.contains('T') && (value.ends_with('Z') || value.contains('+'))
}

fn string_arg(name: &str, value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            tracing::warn!("Invalid `{}`: {}, parameter will be ignored", name, other);
            None
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
