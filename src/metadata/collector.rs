//! Fan-out collection of table samples.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use futures::stream::{self, StreamExt};

use super::provider::TableSampler;
use super::types::TableInfo;
use crate::store::{self, StoreResult};

/// Sample every table with at most `max_concurrency` probes in flight.
///
/// Results arrive in completion order. A table whose probe fails is logged
/// and left out; it never aborts the batch. Repeated identifiers are sampled
/// once.
pub async fn collect_all<S>(sampler: &S, tables: &[String], max_concurrency: usize) -> Vec<TableInfo>
where
    S: TableSampler + ?Sized,
{
    let mut seen = HashSet::new();
    let unique: Vec<&str> = tables
        .iter()
        .map(String::as_str)
        .filter(|table| {
            let first = seen.insert(*table);
            if !first {
                tracing::warn!(table, "duplicate table in list, sampling once");
            }
            first
        })
        .collect();

    let mut results = Vec::with_capacity(unique.len());
    let mut probes = stream::iter(unique)
        .map(|table| async move { (table, sampler.sample(table).await) })
        .buffer_unordered(max_concurrency.max(1));

    while let Some((table, outcome)) = probes.next().await {
        match outcome {
            Ok(info) => {
                tracing::info!(table, columns = info.columns.len(), "sampled table");
                results.push(info);
            }
            Err(e) => tracing::warn!(
                table,
                unreachable = e.is_connection(),
                error = %e,
                "failed to sample table, skipping"
            ),
        }
    }

    results
}

/// Sample every table and write the results to `output_path`.
pub async fn collect_to_file<S>(
    sampler: &S,
    tables: &[String],
    max_concurrency: usize,
    output_path: &Path,
) -> StoreResult<Vec<TableInfo>>
where
    S: TableSampler + ?Sized,
{
    let start = Instant::now();
    tracing::info!(
        tables = tables.len(),
        max_workers = max_concurrency,
        "sampling tables"
    );

    let results = collect_all(sampler, tables, max_concurrency).await;
    store::write_json(output_path, &results)?;

    tracing::info!(
        path = %output_path.display(),
        sampled = results.len(),
        failed = tables.len().saturating_sub(results.len()),
        elapsed = ?start.elapsed(),
        "wrote table info"
    );
    Ok(results)
}
