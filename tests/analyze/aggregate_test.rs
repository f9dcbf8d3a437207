//! Integration tests for cross-table column statistics.

use std::fs;

use colscout::analyze::aggregate;
use colscout::classify::{output_path, ClassificationResult};
use colscout::store;

fn result(table: &str, metric: &[&str], dimension: &[&str], excluded: &[&str]) -> ClassificationResult {
    ClassificationResult {
        table_name: table.to_string(),
        metric: metric.iter().map(|s| s.to_string()).collect(),
        dimension: dimension.iter().map(|s| s.to_string()).collect(),
        excluded: excluded.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_aggregate_directory() {
    let dir = tempfile::tempdir().unwrap();
    for doc in [
        result("orders", &["revenue"], &["country", "order_date_local"], &["etl_ts"]),
        result("events", &["visit_count", "revenue"], &["country"], &["etl_ts"]),
        result("accounts", &[], &["country"], &[]),
    ] {
        store::write_json(&output_path(dir.path(), &doc.table_name), &doc).unwrap();
    }

    let stats = aggregate(dir.path()).unwrap();

    // accounts.json sorts first, then events.json, then orders.json
    let dimensions: Vec<_> = stats.dimensions.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(dimensions, vec!["country", "order_date_local"]);
    let metrics: Vec<_> = stats.metrics.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(metrics, vec!["revenue", "visit_count"]);

    let country = &stats.dimensions[0];
    assert_eq!(country.frequency, 3);
    assert_eq!(country.table_coverage, 3);

    let revenue = &stats.metrics[0];
    assert_eq!(revenue.frequency, 2);
    assert_eq!(revenue.tables, vec!["events", "orders"]);

    assert!(stats.metrics.iter().all(|s| s.name != "etl_ts"));
    assert!(stats.dimensions.iter().all(|s| s.name != "etl_ts"));
}

#[test]
fn test_unreadable_documents_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let orders = result("orders", &["revenue"], &[], &[]);
    store::write_json(&output_path(dir.path(), "orders"), &orders).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("other.json"), r#"{"unexpected": true}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let stats = aggregate(dir.path()).unwrap();

    assert_eq!(stats.metrics.len(), 1);
    assert_eq!(stats.metrics[0].name, "revenue");
    assert!(stats.dimensions.is_empty());
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let stats = aggregate(dir.path()).unwrap();
    assert!(stats.is_empty());
}

#[test]
fn test_missing_directory_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(aggregate(&dir.path().join("nope")).is_err());
}
