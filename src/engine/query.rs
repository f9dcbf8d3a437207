//! Sample query construction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{EngineError, EngineResult};

/// A bare identifier part (`orders`, `dw_2024`) or a double-quoted one with
/// `""` as the only escape (`"Order Lines"`).
static IDENTIFIER_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?:[A-Za-z_][A-Za-z0-9_]*|"(?:[^"]|"")+")$"#).unwrap());

/// Check that a table identifier is one to three dot-separated parts.
pub fn validate_table_identifier(table: &str) -> EngineResult<()> {
    let parts = split_identifier(table);
    let valid = !parts.is_empty()
        && parts.len() <= 3
        && parts.iter().all(|part| IDENTIFIER_PART.is_match(part));

    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidIdentifier(table.to_string()))
    }
}

/// Build the one-row probe for a table.
pub fn sample_query(table: &str) -> EngineResult<String> {
    validate_table_identifier(table)?;
    Ok(format!("SELECT * FROM {} LIMIT 1", table))
}

/// Split on dots that are not inside double quotes.
fn split_identifier(table: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, ch) in table.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(&table[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&table[start..]);
    parts
}
