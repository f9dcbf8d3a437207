//! QA shortlist selection.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::aggregate::{ColumnStat, ColumnStats};
use crate::config::SelectionSettings;
use crate::llm::json::parse_object;
use crate::llm::{complete_within, LanguageModel, LlmError};

/// Priority order handed to the model.
pub const PRIORITY: &str = "frequency > table_coverage > qa_importance";

/// Errors from the selection call. Any of them ends the run.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("malformed selection: {0}")]
    Parse(String),

    #[error("failed to serialize selection input: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Declared limits for the shortlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionConstraints {
    pub max_metrics: usize,
    pub max_dimensions: usize,
    pub allow_exceed_if_needed: bool,
    pub priority: String,
}

impl From<&SelectionSettings> for SelectionConstraints {
    fn from(settings: &SelectionSettings) -> Self {
        Self {
            max_metrics: settings.max_metrics,
            max_dimensions: settings.max_dimensions,
            allow_exceed_if_needed: settings.allow_exceed_if_needed,
            priority: PRIORITY.to_string(),
        }
    }
}

impl Default for SelectionConstraints {
    fn default() -> Self {
        Self::from(&SelectionSettings::default())
    }
}

/// A shortlisted column with the model's justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectedColumn {
    pub name: String,
    pub reason: String,
}

/// The shortlist written to `qa_key_columns.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QaSelection {
    pub selected_metrics: Vec<SelectedColumn>,
    pub selected_dimensions: Vec<SelectedColumn>,
}

#[derive(Serialize)]
struct SelectionPayload<'a> {
    metrics: &'a [ColumnStat],
    dimensions: &'a [ColumnStat],
    constraints: &'a SelectionConstraints,
}

/// Render the selection prompt around the JSON payload.
pub fn render_prompt(
    stats: &ColumnStats,
    constraints: &SelectionConstraints,
) -> Result<String, SelectionError> {
    let payload = SelectionPayload {
        metrics: &stats.metrics,
        dimensions: &stats.dimensions,
        constraints,
    };
    let input = serde_json::to_string_pretty(&payload).map_err(SelectionError::Payload)?;

    let exceed_rule = if constraints.allow_exceed_if_needed {
        "- You MAY exceed these targets if necessary to ensure full table coverage"
    } else {
        "- Do NOT exceed these targets"
    };

    Ok(format!(
        r#"
You are a senior data warehouse QA expert.

Given the list of metrics and dimensions extracted from multiple tables,
select the most important ones for QA coverage.

Rules:
- Do NOT merge or normalize names
- Keep column names exactly as-is
- Deduplicate identical names only
- Dimensions are most likely country-specific columns and dates related to orders or events
- revenue, visit, count and amount columns are likely metrics
- Prioritize:
  1. Frequency of appearance
  2. Table coverage
  3. QA risk / importance
- Target:
  - Up to {max_metrics} metrics
  - Up to {max_dimensions} dimensions
{exceed_rule}
- Give every selected name a short, non-empty reason

Return JSON ONLY in the following format:

{{
  "selected_metrics": [
    {{"name": "...", "reason": "..."}}
  ],
  "selected_dimensions": [
    {{"name": "...", "reason": "..."}}
  ]
}}

Input:
{input}
"#,
        max_metrics = constraints.max_metrics,
        max_dimensions = constraints.max_dimensions,
        exceed_rule = exceed_rule,
        input = input,
    ))
}

/// Parse model text into a shortlist and check it against the statistics.
///
/// Exact duplicate names keep their first entry and names that are not in
/// the corresponding statistics are dropped; both are logged.
pub fn parse_selection(text: &str, stats: &ColumnStats) -> Result<QaSelection, SelectionError> {
    let value = parse_object(text)?;
    let selection: QaSelection =
        serde_json::from_value(value).map_err(|e| SelectionError::Parse(e.to_string()))?;

    if let Some(blank) = selection
        .selected_metrics
        .iter()
        .chain(&selection.selected_dimensions)
        .find(|c| c.reason.trim().is_empty())
    {
        return Err(SelectionError::Parse(format!(
            "no reason given for {:?}",
            blank.name
        )));
    }

    Ok(QaSelection {
        selected_metrics: retain_known(selection.selected_metrics, &stats.metrics, "metric"),
        selected_dimensions: retain_known(
            selection.selected_dimensions,
            &stats.dimensions,
            "dimension",
        ),
    })
}

fn retain_known(selected: Vec<SelectedColumn>, stats: &[ColumnStat], role: &str) -> Vec<SelectedColumn> {
    let known: HashSet<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    let mut seen = HashSet::new();

    selected
        .into_iter()
        .filter(|column| {
            if !known.contains(column.name.as_str()) {
                tracing::warn!(role, name = %column.name, "dropping selected name that was never classified");
                return false;
            }
            if !seen.insert(column.name.clone()) {
                tracing::warn!(role, name = %column.name, "dropping duplicate selected name");
                return false;
            }
            true
        })
        .collect()
}

/// Ask the model for the QA shortlist in a single call.
///
/// With no statistics at all the model is not called and the shortlist is
/// empty.
pub async fn select<M>(
    model: &M,
    stats: &ColumnStats,
    constraints: &SelectionConstraints,
    timeout: Duration,
) -> Result<QaSelection, SelectionError>
where
    M: LanguageModel + ?Sized,
{
    if stats.is_empty() {
        tracing::warn!("no classified metrics or dimensions, shortlist is empty");
        return Ok(QaSelection::default());
    }

    let prompt = render_prompt(stats, constraints)?;
    tracing::info!(
        metrics = stats.metrics.len(),
        dimensions = stats.dimensions.len(),
        "sending column statistics to model"
    );

    let start = Instant::now();
    let text = complete_within(model, &prompt, timeout).await?;
    tracing::info!(elapsed = ?start.elapsed(), "model completed");

    let selection = parse_selection(&text, stats)?;
    tracing::info!(
        metrics = selection.selected_metrics.len(),
        dimensions = selection.selected_dimensions.len(),
        "shortlist selected"
    );
    Ok(selection)
}
