//! Cross-table column statistics.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::ClassificationResult;
use crate::store::{self, StoreResult};

/// How often one column name was given one role across tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStat {
    pub name: String,
    /// Number of classification documents that gave the name this role.
    pub frequency: usize,
    /// Number of distinct tables that gave the name this role.
    pub table_coverage: usize,
    /// Those tables, sorted.
    pub tables: Vec<String>,
}

/// Metric and dimension statistics, each in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub metrics: Vec<ColumnStat>,
    pub dimensions: Vec<ColumnStat>,
}

impl ColumnStats {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.dimensions.is_empty()
    }
}

/// Per-name counters that remember first-encounter order.
#[derive(Default)]
struct Tally {
    order: Vec<String>,
    counts: HashMap<String, (usize, BTreeSet<String>)>,
}

impl Tally {
    fn record(&mut self, name: &str, table: &str) {
        if !self.counts.contains_key(name) {
            self.order.push(name.to_string());
        }
        let entry = self.counts.entry(name.to_string()).or_default();
        entry.0 += 1;
        entry.1.insert(table.to_string());
    }

    fn into_stats(mut self) -> Vec<ColumnStat> {
        self.order
            .into_iter()
            .filter_map(|name| {
                let (frequency, tables) = self.counts.remove(&name)?;
                Some(ColumnStat {
                    name,
                    frequency,
                    table_coverage: tables.len(),
                    tables: tables.into_iter().collect(),
                })
            })
            .collect()
    }
}

/// Aggregate already-loaded classification results.
///
/// Names are merged only when they are identical strings.
pub fn aggregate_results<'a, I>(results: I) -> ColumnStats
where
    I: IntoIterator<Item = &'a ClassificationResult>,
{
    let mut metrics = Tally::default();
    let mut dimensions = Tally::default();

    for result in results {
        for name in &result.metric {
            metrics.record(name, &result.table_name);
        }
        for name in &result.dimension {
            dimensions.record(name, &result.table_name);
        }
    }

    ColumnStats {
        metrics: metrics.into_stats(),
        dimensions: dimensions.into_stats(),
    }
}

/// Read every `*.json` document in `output_dir` and aggregate them.
///
/// Documents are visited in file-name order so the result is deterministic
/// for a given directory. A document that cannot be read as a
/// classification is logged and skipped.
pub fn aggregate(output_dir: &Path) -> StoreResult<ColumnStats> {
    let mut results = Vec::new();
    for path in store::list_json_files(output_dir)? {
        match store::read_json::<ClassificationResult>(&path) {
            Ok(result) => results.push(result),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable classification document"),
        }
    }

    let stats = aggregate_results(&results);
    tracing::info!(
        documents = results.len(),
        metrics = stats.metrics.len(),
        dimensions = stats.dimensions.len(),
        "collected column statistics"
    );
    Ok(stats)
}
