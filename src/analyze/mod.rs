//! Cross-table analysis of classification documents.
//!
//! [`aggregate`] turns `output/*.json` into per-name statistics for metrics
//! and dimensions; [`select`] hands those statistics to the language model
//! and gets back a QA shortlist.

mod aggregate;
mod select;

pub use aggregate::{aggregate, aggregate_results, ColumnStat, ColumnStats};
pub use select::{
    parse_selection, render_prompt, select, QaSelection, SelectedColumn, SelectionConstraints,
    SelectionError, PRIORITY,
};
