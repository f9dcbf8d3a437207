//! Checking model answers against the classification contract.
//!
//! The model is told to partition a table's columns into dimension, metric
//! and excluded, but nothing forces it to. Answers are first checked for
//! shape, then repaired into a partition of the table's real columns.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use super::error::ClassifyError;
use super::types::{ClassificationResult, Role};
use crate::llm::json::parse_object;
use crate::metadata::TableInfo;

/// Exact shape the model must answer with.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassification {
    table_name: String,
    dimension: Vec<String>,
    metric: Vec<String>,
    excluded: Vec<String>,
    reasoning: BTreeMap<String, String>,
}

/// What had to be repaired to turn an answer into a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionReport {
    /// Names the model classified that are not columns of the table.
    pub unknown: Vec<String>,
    /// Columns claimed by more than one role, with the role they kept.
    pub conflicts: Vec<(String, Role)>,
    /// Columns the model did not classify at all.
    pub unclassified: Vec<String>,
}

impl PartitionReport {
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.conflicts.is_empty() && self.unclassified.is_empty()
    }
}

/// Parse model text for `table` into a validated classification.
///
/// # Errors
///
/// - `MissingTableName` if `table_name` is absent, null or empty
/// - `Parse` for invalid JSON or any missing, extra or mistyped field
/// - `TableMismatch` if the answer names another table
pub fn parse_response(
    text: &str,
    table: &TableInfo,
) -> Result<(ClassificationResult, PartitionReport), ClassifyError> {
    let value = parse_object(text)?;

    match value.get("table_name") {
        None | Some(Value::Null) => return Err(ClassifyError::MissingTableName),
        Some(Value::String(name)) if name.trim().is_empty() => {
            return Err(ClassifyError::MissingTableName)
        }
        _ => {}
    }

    let raw: RawClassification =
        serde_json::from_value(value).map_err(|e| ClassifyError::Parse(e.to_string()))?;

    if raw.table_name != table.table_name {
        return Err(ClassifyError::TableMismatch {
            expected: table.table_name.clone(),
            found: raw.table_name,
        });
    }

    Ok(enforce_partition(raw, table))
}

/// Keep only real columns and give each one at most one role.
fn enforce_partition(
    raw: RawClassification,
    table: &TableInfo,
) -> (ClassificationResult, PartitionReport) {
    let mut report = PartitionReport::default();
    let mut result = ClassificationResult {
        table_name: raw.table_name,
        reasoning: raw.reasoning,
        ..Default::default()
    };

    let claims: BTreeMap<Role, Vec<String>> = [
        (Role::Dimension, raw.dimension),
        (Role::Metric, raw.metric),
        (Role::Excluded, raw.excluded),
    ]
    .into_iter()
    .collect();

    let mut unknown = BTreeSet::new();
    for role in Role::PRECEDENCE {
        for name in &claims[&role] {
            if !table.has_column(name) {
                unknown.insert(name.clone());
                continue;
            }
            match result.role_of(name) {
                None => {
                    result.role_mut(role).insert(name.clone());
                }
                Some(kept) if kept != role => {
                    if !report.conflicts.iter().any(|(c, _)| c == name) {
                        report.conflicts.push((name.clone(), kept));
                    }
                }
                Some(_) => {}
            }
        }
    }
    report.unknown = unknown.into_iter().collect();

    report.unclassified = table
        .columns
        .iter()
        .filter(|column| result.role_of(column).is_none())
        .cloned()
        .collect();

    (result, report)
}
