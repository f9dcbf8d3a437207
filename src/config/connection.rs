//! Query engine and model server configuration.
//!
//! Both records are read from environment variables:
//! - `HOST`, `PORT`, `USER`, `PASSWORD`, `HTTP_SCHEME`, `CATALOG`, `VERIFY`:
//!   query engine connection
//! - `LLM_HOST`, `LLM_MODEL`: model server
//! - `TABLE_LIST`: comma-separated tables to sample
//!
//! A `.env` file fills in keys the process environment does not set.
//! Every required key is checked before failing, so a single error lists
//! everything that is missing or malformed.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Error type for environment configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Unset or blank required keys, and keys whose values do not parse.
    #[error("{}", describe_problems(.missing, .invalid))]
    Env {
        missing: Vec<String>,
        invalid: Vec<String>,
    },

    /// A `.env` file exists but cannot be read.
    #[error("Failed to read {}: {message}", .path.display())]
    EnvFile { path: PathBuf, message: String },
}

fn describe_problems(missing: &[String], invalid: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        ));
    }
    if !invalid.is_empty() {
        parts.push(format!("Invalid environment variables: {}", invalid.join("; ")));
    }
    parts.join("; ")
}

/// Key lookup over the process environment with a `.env` fallback.
///
/// Keys set in the process environment win over the file.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    file: HashMap<String, String>,
}

impl EnvSource {
    /// Read `.env` from the working directory or one of its parents.
    ///
    /// No file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let default_path = Path::new(".env");
        match dotenvy::dotenv_iter() {
            Ok(iter) => Self::read(iter, default_path),
            Err(e) if e.not_found() => Ok(Self::default()),
            Err(e) => Err(env_file_error(default_path, e)),
        }
    }

    /// Read a specific env file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| env_file_error(path, e))?;
        Self::read(iter, path)
    }

    fn read<I>(iter: I, path: &Path) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = dotenvy::Result<(String, String)>>,
    {
        let mut file = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| env_file_error(path, e))?;
            file.insert(key, value);
        }
        tracing::debug!(path = %path.display(), keys = file.len(), "loaded env file");
        Ok(Self { file })
    }

    /// Value of `key`, from the process environment first.
    pub fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.file.get(key).cloned())
    }
}

fn env_file_error(path: &Path, error: dotenvy::Error) -> ConfigError {
    ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Collects missing and malformed keys while records are being built.
#[derive(Default)]
struct Problems {
    missing: Vec<String>,
    invalid: Vec<String>,
}

impl Problems {
    fn require<F>(&mut self, lookup: &F, key: &str) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(key) {
            Some(value) if !value.trim().is_empty() => Some(value),
            _ => {
                self.missing.push(key.to_string());
                None
            }
        }
    }

    fn invalid(&mut self, key: &str, reason: impl fmt::Display) {
        self.invalid.push(format!("{}: {}", key, reason));
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ConfigError> {
        match value {
            Some(value) if self.missing.is_empty() && self.invalid.is_empty() => Ok(value),
            _ => Err(ConfigError::Env {
                missing: self.missing,
                invalid: self.invalid,
            }),
        }
    }
}

/// HTTP scheme used to reach the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpScheme {
    Http,
    Https,
}

impl HttpScheme {
    /// Parse a scheme from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Some(HttpScheme::Http),
            "https" => Some(HttpScheme::Https),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpScheme::Http => "http",
            HttpScheme::Https => "https",
        }
    }
}

/// Parse a boolean flag the way shell users tend to write them.
fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Query engine connection configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Coordinator hostname.
    pub host: String,
    /// Coordinator port.
    pub port: u16,
    /// User for `X-Trino-User` and basic auth.
    pub user: String,
    /// Basic auth password.
    pub password: String,
    /// http or https.
    pub scheme: HttpScheme,
    /// Catalog queries resolve against.
    pub catalog: String,
    /// Verify the server TLS certificate.
    pub verify_tls: bool,
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("scheme", &self.scheme)
            .field("catalog", &self.catalog)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl ConnectionConfig {
    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Problems::default();
        let config = Self::collect(&lookup, &mut problems);
        problems.finish(config)
    }

    fn collect<F>(lookup: &F, problems: &mut Problems) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = problems.require(lookup, "HOST");
        let port = problems.require(lookup, "PORT").and_then(|raw| {
            raw.trim()
                .parse::<u16>()
                .map_err(|e| problems.invalid("PORT", format!("'{}' ({})", raw, e)))
                .ok()
        });
        let user = problems.require(lookup, "USER");
        let password = problems.require(lookup, "PASSWORD");
        let scheme = problems.require(lookup, "HTTP_SCHEME").and_then(|raw| {
            let scheme = HttpScheme::from_str(&raw);
            if scheme.is_none() {
                problems.invalid("HTTP_SCHEME", format!("'{}' (expected http or https)", raw));
            }
            scheme
        });
        let catalog = problems.require(lookup, "CATALOG");
        let verify_tls = problems.require(lookup, "VERIFY").and_then(|raw| {
            let flag = parse_flag(&raw);
            if flag.is_none() {
                problems.invalid("VERIFY", format!("'{}' (expected true or false)", raw));
            }
            flag
        });

        Some(Self {
            host: host?,
            port: port?,
            user: user?,
            password: password?,
            scheme: scheme?,
            catalog: catalog?,
            verify_tls: verify_tls?,
        })
    }

    /// Base URL of the coordinator, e.g. `https://trino.internal:443`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

/// Model server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Base URL of the model server.
    pub host: String,
    /// Model identifier.
    pub model: String,
}

impl LlmConfig {
    /// Load configuration from the environment and `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = EnvSource::load()?;
        Self::from_lookup(|key| source.get(key))
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Problems::default();
        let config = Self::collect(&lookup, &mut problems);
        problems.finish(config)
    }

    fn collect<F>(lookup: &F, problems: &mut Problems) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = problems.require(lookup, "LLM_HOST");
        let model = problems.require(lookup, "LLM_MODEL");
        Some(Self {
            host: host?.trim_end_matches('/').to_string(),
            model: model?,
        })
    }
}

/// Read `TABLE_LIST` into trimmed, non-empty table names.
fn collect_table_list<F>(lookup: &F, problems: &mut Problems) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = problems.require(lookup, "TABLE_LIST")?;
    let tables: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tables.is_empty() {
        problems.invalid("TABLE_LIST", "no table names after splitting on ','");
        return None;
    }
    Some(tables)
}

/// Environment record for every stage of the pipeline.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub connection: ConnectionConfig,
    pub llm: LlmConfig,
    pub tables: Vec<String>,
}

impl EnvConfig {
    /// Load the full record from the environment and `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = EnvSource::load()?;
        Self::from_lookup(|key| source.get(key))
    }

    /// Load the full record, reporting every problem of every part at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Problems::default();
        let connection = ConnectionConfig::collect(&lookup, &mut problems);
        let llm = LlmConfig::collect(&lookup, &mut problems);
        let tables = collect_table_list(&lookup, &mut problems);

        let config = match (connection, llm, tables) {
            (Some(connection), Some(llm), Some(tables)) => Some(Self {
                connection,
                llm,
                tables,
            }),
            _ => None,
        };
        problems.finish(config)
    }
}
