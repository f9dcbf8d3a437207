//! Stage orchestration.
//!
//! Each stage reads the previous stage's artifact from disk and fully
//! rewrites its own, so stages can be run one at a time or back to back.
//! Running them back to back is strictly sequential: a stage starts only
//! after the previous one has written its artifact.

use std::time::Instant;

use thiserror::Error;

use crate::analyze::{self, QaSelection, SelectionConstraints, SelectionError};
use crate::classify::{self, ClassifySummary};
use crate::config::{ConfigError, Settings, SettingsError};
use crate::engine::EngineError;
use crate::llm::LanguageModel;
use crate::metadata::{self, TableInfo, TableSampler};
use crate::store::{self, StoreError};

/// Run-level failures. Any of these ends the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stage 1: sample every table and write the table-info document.
pub async fn run_collect<S>(
    sampler: &S,
    tables: &[String],
    settings: &Settings,
) -> PipelineResult<Vec<TableInfo>>
where
    S: TableSampler + ?Sized,
{
    let path = settings.paths.table_info_path()?;
    let start = Instant::now();
    tracing::info!("stage collect started");

    let infos =
        metadata::collect_to_file(sampler, tables, settings.sampling.max_workers, &path).await?;

    tracing::info!(elapsed = ?start.elapsed(), "stage collect finished");
    Ok(infos)
}

/// Stage 2: classify every table in the table-info document.
pub async fn run_classify<M>(model: &M, settings: &Settings) -> PipelineResult<ClassifySummary>
where
    M: LanguageModel + ?Sized,
{
    let table_info = settings.paths.table_info_path()?;
    let output_dir = settings.paths.output_dir_path()?;
    let start = Instant::now();
    tracing::info!(input = %table_info.display(), "stage classify started");

    let summary =
        classify::classify_from_file(model, &table_info, &settings.classification, &output_dir)
            .await?;

    tracing::info!(elapsed = ?start.elapsed(), "stage classify finished");
    Ok(summary)
}

/// Stages 3 and 4: aggregate classifications and write the QA shortlist.
///
/// Nothing is written when selection fails.
pub async fn run_analyze<M>(model: &M, settings: &Settings) -> PipelineResult<QaSelection>
where
    M: LanguageModel + ?Sized,
{
    let output_dir = settings.paths.output_dir_path()?;
    let selection_path = settings.paths.selection_path()?;
    let start = Instant::now();
    tracing::info!(input = %output_dir.display(), "stage analyze started");

    let stats = analyze::aggregate(&output_dir)?;
    let constraints = SelectionConstraints::from(&settings.selection);
    let selection =
        analyze::select(model, &stats, &constraints, settings.selection.timeout()).await?;
    store::write_json(&selection_path, &selection)?;

    tracing::info!(
        path = %selection_path.display(),
        elapsed = ?start.elapsed(),
        "stage analyze finished"
    );
    Ok(selection)
}
