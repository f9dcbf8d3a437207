//! Chunked, bounded-concurrency classification of sampled tables.

use std::path::{Path, PathBuf};
use std::time::Instant;

use futures::future::join_all;

use super::error::ClassifyError;
use super::prompt::render_prompt;
use super::types::ClassificationResult;
use super::validate::{parse_response, PartitionReport};
use crate::config::ClassificationSettings;
use crate::llm::{complete_within, LanguageModel};
use crate::metadata::TableInfo;
use crate::store::{self, StoreResult};

/// Outcome of a classification run.
#[derive(Debug, Clone, Default)]
pub struct ClassifySummary {
    /// Documents written, in chunk order.
    pub written: Vec<PathBuf>,
    /// Tables that produced no document, with the reason.
    pub dropped: Vec<(String, String)>,
}

/// Path of the classification document for `table_name`.
pub fn output_path(output_dir: &Path, table_name: &str) -> PathBuf {
    output_dir.join(format!("{}.json", table_name))
}

/// Check that a table name is usable as a single file name.
fn is_safe_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Classify one table, retrying failed attempts up to `max_retries` times.
pub async fn classify_table<M>(
    model: &M,
    table: &TableInfo,
    settings: &ClassificationSettings,
) -> Result<ClassificationResult, ClassifyError>
where
    M: LanguageModel + ?Sized,
{
    if !is_safe_file_stem(&table.table_name) {
        return Err(ClassifyError::InvalidTableName(table.table_name.clone()));
    }

    let prompt = render_prompt(table).map_err(|e| ClassifyError::Parse(e.to_string()))?;
    let attempts = settings.max_retries + 1;
    let mut attempt = 1;

    loop {
        let outcome = match complete_within(model, &prompt, settings.timeout()).await {
            Ok(text) => parse_response(&text, table),
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok((result, report)) => {
                if !report.is_clean() {
                    log_repairs(&table.table_name, &report);
                }
                return Ok(result);
            }
            Err(e) if e.is_retriable() && attempt < attempts => {
                tracing::warn!(
                    table = %table.table_name,
                    attempt,
                    error = %e,
                    "classification attempt failed, retrying"
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn log_repairs(table: &str, report: &PartitionReport) {
    for name in &report.unknown {
        tracing::warn!(table, column = %name, "dropped classified name that is not a column");
    }
    for (name, kept) in &report.conflicts {
        tracing::warn!(table, column = %name, kept = %kept, "column had several roles");
    }
    if !report.unclassified.is_empty() {
        tracing::warn!(table, columns = ?report.unclassified, "columns left unclassified");
    }
}

/// Classify every table and write one document per table into `output_dir`.
///
/// Tables are processed in consecutive chunks of `chunk_size`; the calls of a
/// chunk run concurrently and the next chunk starts once all of them have
/// finished. A table whose calls are exhausted is logged and skipped.
/// Existing documents for the same table are overwritten.
///
/// # Errors
///
/// Only failing to write a document aborts the run.
pub async fn classify_all<M>(
    model: &M,
    tables: &[TableInfo],
    settings: &ClassificationSettings,
    output_dir: &Path,
) -> StoreResult<ClassifySummary>
where
    M: LanguageModel + ?Sized,
{
    let chunk_size = settings.chunk_size.max(1);
    let total_start = Instant::now();
    let mut summary = ClassifySummary::default();

    tracing::info!(
        tables = tables.len(),
        chunk_size,
        timeout_secs = settings.timeout_secs,
        max_retries = settings.max_retries,
        "classifying tables"
    );

    for (chunk_idx, chunk) in tables.chunks(chunk_size).enumerate() {
        let chunk_no = chunk_idx + 1;
        let names: Vec<&str> = chunk.iter().map(|t| t.table_name.as_str()).collect();
        tracing::info!(chunk = chunk_no, tables = %names.join(", "), "chunk started");

        let chunk_start = Instant::now();
        let outcomes = join_all(chunk.iter().map(|t| classify_table(model, t, settings))).await;
        tracing::info!(chunk = chunk_no, elapsed = ?chunk_start.elapsed(), "chunk completed");

        for (table, outcome) in chunk.iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    let path = output_path(output_dir, &result.table_name);
                    store::write_json(&path, &result)?;
                    tracing::info!(table = %result.table_name, path = %path.display(), "saved classification");
                    summary.written.push(path);
                }
                Err(ClassifyError::MissingTableName) => {
                    tracing::warn!(table = %table.table_name, "skipped response without table_name");
                    summary
                        .dropped
                        .push((table.table_name.clone(), ClassifyError::MissingTableName.to_string()));
                }
                Err(e) => {
                    tracing::warn!(
                        table = %table.table_name,
                        timed_out = e.is_timeout(),
                        error = %e,
                        "classification failed, no document written"
                    );
                    summary.dropped.push((table.table_name.clone(), e.to_string()));
                }
            }
        }
    }

    tracing::info!(
        written = summary.written.len(),
        dropped = summary.dropped.len(),
        elapsed = ?total_start.elapsed(),
        "all chunks completed"
    );
    Ok(summary)
}

/// Read the table-info document and classify every table in it.
pub async fn classify_from_file<M>(
    model: &M,
    table_info_path: &Path,
    settings: &ClassificationSettings,
    output_dir: &Path,
) -> StoreResult<ClassifySummary>
where
    M: LanguageModel + ?Sized,
{
    let tables: Vec<TableInfo> = store::read_json(table_info_path)?;
    classify_all(model, &tables, settings, output_dir).await
}
