//! Table sample records.

use serde::{Deserialize, Serialize};

/// One sampled row of a table, with its column names.
///
/// `columns` and `sample_data` correspond positionally and keep the order
/// the engine returned. A null value is stored as JSON `null`, never as a
/// placeholder string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableInfo {
    pub table_name: String,
    pub columns: Vec<String>,
    pub sample_data: Vec<Option<String>>,
}

impl TableInfo {
    /// Check whether the table has a column with exactly this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}
