//! Query engine error types.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while talking to the query engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The coordinator could not be reached or the transport failed.
    #[error("query engine unreachable: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The engine accepted the statement but reported a failure.
    #[error("query failed: {message} ({name})")]
    Query {
        /// Engine error name, e.g. `TABLE_NOT_FOUND`.
        name: String,
        /// Human-readable error message.
        message: String,
    },

    /// The table identifier is not safe to interpolate into SQL.
    #[error("invalid table identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A request exceeded its HTTP deadline.
    #[error("query engine request timed out after {0} seconds")]
    Timeout(u64),

    /// The engine answered with something that is not the statement protocol.
    #[error("unexpected engine response: {0}")]
    Protocol(String),

    /// Failed to build the HTTP client.
    #[error("failed to build engine client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl EngineError {
    /// Create a connection error from a transport failure.
    pub fn connection(source: reqwest::Error) -> Self {
        Self::Connection {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a query error from an engine error payload.
    pub fn query(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the engine could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout(_))
    }
}
