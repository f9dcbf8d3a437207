//! Table sampling module.
//!
//! This module probes warehouse tables for their column names and one sample
//! row, and fans those probes out across a table list.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         collect_all                             │
//! │   table list ──► buffer_unordered(max_workers) ──► Vec<TableInfo>│
//! │                  failures logged and skipped                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            TableSampler (EngineSampler: SELECT ... LIMIT 1)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use colscout::engine::EngineClient;
//! use colscout::metadata::{collect_to_file, EngineSampler};
//!
//! let sampler = EngineSampler::new(EngineClient::with_timeout(config, timeout)?);
//! let tables = vec!["dw.orders".to_string(), "dw.events".to_string()];
//! let infos = collect_to_file(&sampler, &tables, 10, "table_info.json".as_ref()).await?;
//! ```

mod collector;
mod engine_provider;
mod provider;
mod types;

pub use collector::{collect_all, collect_to_file};
pub use engine_provider::EngineSampler;
pub use provider::{SampleResult, TableSampler};
pub use types::TableInfo;
