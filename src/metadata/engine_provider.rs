//! EngineSampler implementation.
//!
//! Samples tables through the query engine with a `LIMIT 1` probe.

use async_trait::async_trait;

use super::provider::{SampleResult, TableSampler};
use super::types::TableInfo;
use crate::engine::protocol::cell_to_text;
use crate::engine::query::sample_query;
use crate::engine::{EngineClient, EngineError};

/// TableSampler implementation that uses the EngineClient.
///
/// # Example
///
/// ```ignore
/// use colscout::engine::EngineClient;
/// use colscout::metadata::{EngineSampler, TableSampler};
///
/// let sampler = EngineSampler::new(EngineClient::with_timeout(config, timeout)?);
/// let info = sampler.sample("dw.orders").await?;
/// ```
#[derive(Debug, Clone)]
pub struct EngineSampler {
    client: EngineClient,
}

impl EngineSampler {
    pub fn new(client: EngineClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableSampler for EngineSampler {
    async fn sample(&self, table: &str) -> SampleResult<TableInfo> {
        let sql = sample_query(table)?;
        let output = self.client.execute(&sql).await?;
        let columns = output.columns;

        let sample_data = match output.rows.into_iter().next() {
            Some(row) if row.len() == columns.len() => row.iter().map(cell_to_text).collect(),
            Some(row) => {
                return Err(EngineError::Protocol(format!(
                    "{} returned {} values for {} columns",
                    table,
                    row.len(),
                    columns.len()
                )))
            }
            None => {
                tracing::debug!(table, "table is empty, sample values are null");
                vec![None; columns.len()]
            }
        };

        Ok(TableInfo {
            table_name: table.to_string(),
            columns,
            sample_data,
        })
    }
}
