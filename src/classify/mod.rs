//! Per-table column classification.
//!
//! Each sampled table is sent to the language model with a classification
//! prompt; the answer is validated and repaired into a partition of the
//! table's columns, then written to `<output_dir>/<table_name>.json`.
//!
//! ```text
//! table_info.json ──► chunks of chunk_size ──► join_all(classify_table)
//!                                                  │ timeout + retry per call
//!                                                  ▼
//!                                        output/<table_name>.json
//! ```

mod batch;
mod error;
pub mod prompt;
mod types;
mod validate;

pub use batch::{classify_all, classify_from_file, classify_table, output_path, ClassifySummary};
pub use error::ClassifyError;
pub use types::{ClassificationResult, Role};
pub use validate::{parse_response, PartitionReport};
