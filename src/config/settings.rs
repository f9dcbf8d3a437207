//! TOML-based settings for colscout.
//!
//! Supports a config file (colscout.toml) with environment variable expansion
//! in path values. Every section is optional.
//!
//! Example configuration:
//! ```toml
//! [paths]
//! table_info = "${DATA_DIR}/table_info.json"
//! output_dir = "${DATA_DIR}/output"
//! selection = "qa_key_columns.json"
//!
//! [sampling]
//! max_workers = 10
//! request_timeout_secs = 60
//!
//! [classification]
//! chunk_size = 3
//! timeout_secs = 300
//! max_retries = 1
//!
//! [selection]
//! max_metrics = 10
//! max_dimensions = 10
//! allow_exceed_if_needed = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Artifact locations.
    pub paths: PathSettings,

    /// Table sampling.
    pub sampling: SamplingSettings,

    /// Per-table classification.
    pub classification: ClassificationSettings,

    /// Final QA shortlist.
    pub selection: SelectionSettings,
}

/// Artifact locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSettings {
    /// Table-info document written by sampling.
    pub table_info: String,

    /// Directory holding one classification document per table.
    pub output_dir: String,

    /// QA shortlist document.
    pub selection: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            table_info: "table_info.json".to_string(),
            output_dir: "output".to_string(),
            selection: "qa_key_columns.json".to_string(),
        }
    }
}

impl PathSettings {
    /// Table-info path with environment variables expanded.
    pub fn table_info_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.table_info).map(PathBuf::from)
    }

    /// Output directory with environment variables expanded.
    pub fn output_dir_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.output_dir).map(PathBuf::from)
    }

    /// Shortlist path with environment variables expanded.
    pub fn selection_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.selection).map(PathBuf::from)
    }
}

/// Sampling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingSettings {
    /// Maximum number of tables sampled concurrently.
    pub max_workers: usize,

    /// HTTP timeout for a single engine request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            max_workers: 10,
            request_timeout_secs: 60,
        }
    }
}

impl SamplingSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Classification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationSettings {
    /// Tables per chunk; also the number of concurrent model calls.
    pub chunk_size: usize,

    /// Deadline for one model call attempt, in seconds.
    pub timeout_secs: u64,

    /// Retries after a failed attempt.
    pub max_retries: u32,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            timeout_secs: 300,
            max_retries: 1,
        }
    }
}

impl ClassificationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Shortlist settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionSettings {
    /// Soft cap on selected metrics.
    pub max_metrics: usize,

    /// Soft cap on selected dimensions.
    pub max_dimensions: usize,

    /// Allow exceeding the caps when needed for full table coverage.
    pub allow_exceed_if_needed: bool,

    /// Deadline for the selection call, in seconds.
    pub timeout_secs: u64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_metrics: 10,
            max_dimensions: 10,
            allow_exceed_if_needed: true,
            timeout_secs: 300,
        }
    }
}

impl SelectionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `COLSCOUT_CONFIG`
    /// 2. `./colscout.toml`
    /// 3. `~/.config/colscout/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("COLSCOUT_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("colscout.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("colscout").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values that would stall or disable a stage.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let zero_checks = [
            ("sampling.max_workers", self.sampling.max_workers as u64),
            ("sampling.request_timeout_secs", self.sampling.request_timeout_secs),
            ("classification.chunk_size", self.classification.chunk_size as u64),
            ("classification.timeout_secs", self.classification.timeout_secs),
            ("selection.timeout_secs", self.selection.timeout_secs),
        ];

        let zeroed: Vec<&str> = zero_checks
            .iter()
            .filter(|(_, value)| *value == 0)
            .map(|(name, _)| *name)
            .collect();

        if zeroed.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::InvalidConfig(format!(
                "must be greater than zero: {}",
                zeroed.join(", ")
            )))
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
