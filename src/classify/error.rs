//! Classification error types.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors for a single table's classification call.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The model call itself failed or timed out.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The model answered with JSON of the wrong shape.
    #[error("malformed classification: {0}")]
    Parse(String),

    /// The model answer has no `table_name`.
    #[error("response has no table_name")]
    MissingTableName,

    /// The model answered for a different table.
    #[error("response is for table {found:?}, expected {expected:?}")]
    TableMismatch { expected: String, found: String },

    /// The table name cannot be used as an output file name.
    #[error("table name {0:?} cannot be used as a file name")]
    InvalidTableName(String),
}

impl ClassifyError {
    /// Check if another attempt could succeed.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::MissingTableName | Self::InvalidTableName(_))
    }

    /// Check if the call ran past its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Llm(LlmError::Timeout(_)))
    }
}
