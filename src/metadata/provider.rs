//! TableSampler trait definition.
//!
//! The sampler abstracts over how a one-row probe of a table is obtained.
//! The primary implementation uses the [`EngineClient`](crate::engine::EngineClient);
//! tests substitute in-memory samplers.

use async_trait::async_trait;

use super::types::TableInfo;
use crate::engine::EngineError;

/// Result type for sampling operations.
pub type SampleResult<T> = Result<T, EngineError>;

/// Trait for probing a table's shape.
///
/// # Errors
///
/// Implementations fail with a connection-class [`EngineError`] when the
/// engine is unreachable and with a query-class one when the identifier does
/// not resolve to a queryable table.
#[async_trait]
pub trait TableSampler: Send + Sync {
    /// Fetch the column names and one sample row of `table`.
    async fn sample(&self, table: &str) -> SampleResult<TableInfo>;
}
