//! Classification prompt.

use crate::metadata::TableInfo;

const TABLE_INFO_SLOT: &str = "{table_info}";

/// Instructions sent with every table. `{table_info}` is replaced by the
/// table's JSON record.
pub const CLASSIFICATION_PROMPT: &str = r#"
You are a data warehouse modeling expert.

Given the table information below, classify each column into exactly one of the following categories:
- "dimension"
- "metric"
- "excluded"

System-generated columns such as timestamps, technical audit fields, or metadata
(e.g. ts, timestamp, created_at, updated_at, ingestion_time, etl_ts) must be excluded
from both dimension and metric classifications.

[Classification Rules]
- dimension:
  - identifiers (id)
  - string or categorical values
  - dates (business dates, not system timestamps)
  - order_date_local and event_date_local are business dates
  - status or state fields
- metric:
  - numeric values
  - fields intended for aggregation (sum, count, average, etc.)
- excluded:
  - system or technical columns
  - timestamps or audit fields not used for business analysis

[Input]
{table_info}

[Output Rules]
- Output MUST be valid JSON only
- Every column appears in exactly one of "dimension", "metric" or "excluded"
- Give a short reason for each column's classification in "reasoning", keyed by column name
- Copy "table_name" exactly from the input
- Do NOT include explanations or additional text
- Follow this exact JSON structure:

{
  "table_name": "...",
  "dimension": [],
  "metric": [],
  "excluded": [],
  "reasoning": {}
}
"#;

/// Render the classification prompt for one table.
pub fn render_prompt(table: &TableInfo) -> Result<String, serde_json::Error> {
    let table_json = serde_json::to_string(table)?;
    Ok(CLASSIFICATION_PROMPT.replacen(TABLE_INFO_SLOT, &table_json, 1))
}
