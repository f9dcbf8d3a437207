//! # colscout
//!
//! Proposes a cross-table QA column set for a list of warehouse tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        TABLE_LIST ──► metadata::collect_all              │
//! │   (SELECT * ... LIMIT 1 per table, max_workers at once)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ table_info.json
//! ┌─────────────────────────────────────────────────────────┐
//! │                 classify::classify_all                   │
//! │   (chunks of chunk_size, timeout + retry per model call) │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ output/<table_name>.json
//! ┌─────────────────────────────────────────────────────────┐
//! │                   analyze::aggregate                     │
//! │     (frequency and table coverage per column name)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    analyze::select                       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ qa_key_columns.json
//! ```

pub mod analyze;
pub mod classify;
pub mod config;
pub mod engine;
pub mod llm;
pub mod metadata;
pub mod pipeline;
pub mod store;

pub use analyze::{ColumnStat, QaSelection};
pub use classify::{ClassificationResult, Role};
pub use metadata::TableInfo;
