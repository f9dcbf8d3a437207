//! Integration tests for QA shortlist selection.

#[path = "../support/mod.rs"]
mod support;

use std::time::Duration;

use colscout::analyze::{select, ColumnStat, ColumnStats, SelectionConstraints, SelectionError};
use colscout::classify::{output_path, ClassificationResult};
use colscout::config::Settings;
use colscout::pipeline::{run_analyze, PipelineError};
use colscout::store;
use support::{ScriptedModel, Step, SELECTION_KEY};

fn stat(name: &str, tables: &[&str]) -> ColumnStat {
    ColumnStat {
        name: name.to_string(),
        frequency: tables.len(),
        table_coverage: tables.len(),
        tables: tables.iter().map(|t| t.to_string()).collect(),
    }
}

fn stats() -> ColumnStats {
    ColumnStats {
        metrics: vec![stat("revenue", &["orders", "payments"])],
        dimensions: vec![stat("country", &["orders"])],
    }
}

const ANSWER: &str = r#"Here you go:
```json
{
  "selected_metrics": [{"name": "revenue", "reason": "shared by two tables"}],
  "selected_dimensions": [{"name": "country", "reason": "country split"}]
}
```"#;

#[tokio::test(start_paused = true)]
async fn test_single_call() {
    let model = ScriptedModel::new().with(SELECTION_KEY, vec![Step::Reply(ANSWER.to_string())]);

    let selection = select(
        &model,
        &stats(),
        &SelectionConstraints::default(),
        Duration::from_secs(300),
    )
    .await
    .unwrap();

    assert_eq!(model.total_calls(), 1);
    assert_eq!(selection.selected_metrics[0].name, "revenue");
    assert_eq!(selection.selected_dimensions[0].reason, "country split");

    let prompt = model.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Up to 10 metrics"));
    assert!(prompt.contains(r#""name": "revenue""#));
}

#[tokio::test(start_paused = true)]
async fn test_empty_stats_skip_the_model() {
    let model = ScriptedModel::new();

    let selection = select(
        &model,
        &ColumnStats::default(),
        &SelectionConstraints::default(),
        Duration::from_secs(300),
    )
    .await
    .unwrap();

    assert_eq!(model.total_calls(), 0);
    assert!(selection.selected_metrics.is_empty());
    assert!(selection.selected_dimensions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_not_retried() {
    let model = ScriptedModel::new().with(SELECTION_KEY, vec![Step::Hang]);

    let err = select(
        &model,
        &stats(),
        &SelectionConstraints::default(),
        Duration::from_secs(5),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SelectionError::Llm(_)));
    assert_eq!(model.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_analyze_writes_nothing_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("output");
    let selection_path = dir.path().join("qa_key_columns.json");

    let orders = ClassificationResult {
        table_name: "orders".to_string(),
        metric: ["revenue".to_string()].into_iter().collect(),
        ..Default::default()
    };
    store::write_json(&output_path(&output_dir, "orders"), &orders).unwrap();

    let mut settings = Settings::default();
    settings.paths.output_dir = output_dir.to_string_lossy().into_owned();
    settings.paths.selection = selection_path.to_string_lossy().into_owned();

    let model = ScriptedModel::new().with(SELECTION_KEY, vec![Step::Reply("no idea".to_string())]);
    let err = run_analyze(&model, &settings).await.unwrap_err();

    assert!(matches!(err, PipelineError::Selection(_)));
    assert!(!selection_path.exists());
}
