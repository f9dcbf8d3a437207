//! Wire types for the Trino client REST protocol.
//!
//! A statement is submitted with `POST /v1/statement`; every response is a
//! [`QueryResults`] document. The client keeps following `nextUri` until it
//! is absent, collecting `columns` and `data` pages along the way.

use serde::Deserialize;
use serde_json::Value;

/// Path statements are submitted to.
pub const STATEMENT_PATH: &str = "/v1/statement";

/// Request headers understood by the coordinator.
pub mod headers {
    pub const USER: &str = "X-Trino-User";
    pub const CATALOG: &str = "X-Trino-Catalog";
    pub const SOURCE: &str = "X-Trino-Source";
}

/// Value sent as `X-Trino-Source`.
pub const CLIENT_SOURCE: &str = "colscout";

// ============================================================================
// Statement responses
// ============================================================================

/// One page of a statement's results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    /// Engine-assigned query id.
    pub id: String,
    /// Where to fetch the next page; absent once the query is finished.
    #[serde(default)]
    pub next_uri: Option<String>,
    /// Result columns, present from the first page that knows them.
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
    /// Rows in this page.
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    /// Present when the query failed.
    #[serde(default)]
    pub error: Option<QueryError>,
    /// Progress information.
    #[serde(default)]
    pub stats: Option<StatementStats>,
}

/// A result column.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Engine-side failure description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

/// Subset of statement statistics used in logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementStats {
    pub state: String,
}

/// Columns and rows of a finished statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Render a result cell as sample text.
///
/// JSON null stays null; strings are kept verbatim; everything else is
/// rendered as compact JSON (numbers, booleans, arrays, maps, rows).
pub fn cell_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
