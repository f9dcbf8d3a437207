//! Model call error types.

use thiserror::Error;

/// Result type for model calls.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur while calling the language model.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The model server could not be reached.
    #[error("model server request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The model server answered with a non-success status.
    #[error("model server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The call did not finish before its deadline.
    #[error("model call timed out after {0} seconds")]
    Timeout(u64),

    /// The model text is not JSON of the expected shape.
    #[error("model output is not valid JSON: {0}")]
    Parse(String),
}
