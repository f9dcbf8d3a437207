//! Configuration module for colscout.
//!
//! Environment-sourced connection records plus optional TOML settings.
//! Both are validated once at startup and handed to the stages explicitly.

mod connection;
mod settings;

pub use connection::{ConfigError, ConnectionConfig, EnvConfig, EnvSource, HttpScheme, LlmConfig};
pub use settings::{
    expand_env_vars, ClassificationSettings, PathSettings, SamplingSettings, SelectionSettings,
    Settings, SettingsError,
};
