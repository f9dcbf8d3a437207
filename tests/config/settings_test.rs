//! Integration tests for TOML settings.

use std::path::PathBuf;

use colscout::config::{Settings, SettingsError};

#[test]
fn test_full_settings_file() {
    let toml = r#"
[paths]
table_info = "work/table_info.json"
output_dir = "work/output"
selection = "work/qa_key_columns.json"

[sampling]
max_workers = 4
request_timeout_secs = 15

[classification]
chunk_size = 5
timeout_secs = 120
max_retries = 2

[selection]
max_metrics = 20
max_dimensions = 15
allow_exceed_if_needed = false
timeout_secs = 600
"#;

    let settings = Settings::from_toml(toml).unwrap();

    assert_eq!(
        settings.paths.output_dir_path().unwrap(),
        PathBuf::from("work/output")
    );
    assert_eq!(settings.sampling.max_workers, 4);
    assert_eq!(settings.classification.chunk_size, 5);
    assert_eq!(settings.classification.max_retries, 2);
    assert_eq!(settings.selection.max_metrics, 20);
    assert!(!settings.selection.allow_exceed_if_needed);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let settings = Settings::from_toml("[classification]\nchunk_size = 6\n").unwrap();

    assert_eq!(settings.classification.chunk_size, 6);
    assert_eq!(settings.classification.timeout_secs, 300);
    assert_eq!(settings.sampling.max_workers, 10);
    assert_eq!(settings.paths.table_info, "table_info.json");
    assert_eq!(settings.selection.max_dimensions, 10);
}

#[test]
fn test_unknown_keys_rejected() {
    let err = Settings::from_toml("[classification]\nchunk = 6\n").unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}

#[test]
fn test_zero_values_rejected() {
    let err =
        Settings::from_toml("[sampling]\nmax_workers = 0\n[classification]\nchunk_size = 0\n")
            .unwrap_err();
    match err {
        SettingsError::InvalidConfig(message) => {
            assert!(message.contains("sampling.max_workers"));
            assert!(message.contains("classification.chunk_size"));
        }
        other => panic!("expected invalid config, got {:?}", other),
    }
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colscout.toml");
    std::fs::write(&path, "[selection]\nmax_metrics = 3\n").unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.selection.max_metrics, 3);

    let missing = Settings::from_file(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, SettingsError::FileNotFound(_)));
}
