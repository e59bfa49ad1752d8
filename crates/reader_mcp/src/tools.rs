//! The `list_documents` tool
//!
//! Arguments are accepted loosely: a filter with the wrong type or an
//! invalid value is dropped with a warning and the call goes ahead with the
//! remaining filters.

use reader_common::{ReaderError, Result};
use reader_core::{ListQuery, ListResponse, Location, ReaderApi};
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

pub const LIST_DOCUMENTS: &str = "list_documents";

const LIST_DOCUMENTS_DESCRIPTION: &str = "Get the document list via the Reader API. \
Filters are optional; invalid filter values are ignored. Results are one page; \
pass nextPageCursor back as pageCursor to fetch the next page.";

/// Arguments of `list_documents` as sent by the host
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsArgs {
    /// The folder where the document is located: new, later, shortlist, archive or feed
    #[serde(default)]
    #[schemars(with = "Option<Location>")]
    pub location: Option<Value>,

    /// Filter by update time (ISO 8601 with a Z or +hh:mm offset)
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub updated_after: Option<Value>,

    /// Whether to include HTML content
    #[serde(default)]
    #[schemars(with = "Option<bool>")]
    pub with_content: Option<Value>,

    /// Pagination cursor
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub page_cursor: Option<Value>,
}

impl ListDocumentsArgs {
    /// Parse tool arguments; `null` means no filters
    pub fn from_value(arguments: Value) -> Result<Self> {
        match arguments {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(arguments)
                .map_err(|e| ReaderError::ValidationError(format!("Invalid arguments: {}", e))),
            other => Err(ReaderError::ValidationError(format!(
                "Tool arguments must be an object, got {}",
                other
            ))),
        }
    }

    pub fn to_query(&self) -> ListQuery {
        ListQuery::from_json_args(
            self.location.as_ref(),
            self.updated_after.as_ref(),
            self.with_content.as_ref(),
            self.page_cursor.as_ref(),
        )
    }
}

/// Validate filters, fetch one page and hand it back unchanged
pub async fn list_documents(api: &dyn ReaderApi, args: ListDocumentsArgs) -> Result<ListResponse> {
    tracing::info!(
        location = ?args.location,
        updated_after = ?args.updated_after,
        with_content = ?args.with_content,
        page_cursor = ?args.page_cursor,
        "tool list_documents"
    );

    let query = args.to_query();
    match api.fetch_list(&query).await {
        Ok(list) => {
            tracing::debug!(
                count = list.count,
                returned = list.results.len(),
                has_more = list.has_more(),
                "list_documents done"
            );
            Ok(list)
        }
        Err(e) => {
            tracing::error!("Error in tool list_documents: {}", e);
            Err(e)
        }
    }
}

/// JSON schema for the tool input, with subschemas inlined
pub fn list_documents_input_schema() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
    });
    let root = settings
        .into_generator()
        .into_root_schema_for::<ListDocumentsArgs>();

    let mut schema = serde_json::to_value(root).unwrap_or_else(|_| json!({"type": "object"}));
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.remove("definitions");
    }
    schema
}

/// Result of `tools/list`
pub fn tool_list() -> Value {
    json!({
        "tools": [{
            "name": LIST_DOCUMENTS,
            "description": LIST_DOCUMENTS_DESCRIPTION,
            "inputSchema": list_documents_input_schema()
        }]
    })
}
