//! Pulling a JSON document out of model text.

use serde_json::Value;

use super::error::{LlmError, LlmResult};

/// Longest excerpt of model text quoted in a parse error.
const EXCERPT_LEN: usize = 400;

/// Extract the JSON object from model text.
///
/// Models asked for "JSON only" still wrap answers in markdown fences or add
/// a sentence before the object; both are stripped.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    let unfenced = trimmed.strip_prefix("```").map(|rest| {
        // Drop the info string (```json) up to the first newline
        let body = rest.split_once('\n').map_or("", |(_, body)| body);
        body.rsplit_once("```").map_or(body, |(inner, _)| inner).trim()
    });

    // A one-line fence has no newline, so fall back to the whole text
    unfenced
        .and_then(outer_object)
        .or_else(|| outer_object(trimmed))
        .unwrap_or(unfenced.unwrap_or(trimmed))
}

/// Span from the first `{` to the last `}`, if there is one.
fn outer_object(text: &str) -> Option<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    }
}

/// Parse model text into a JSON object.
pub fn parse_object(text: &str) -> LlmResult<Value> {
    let candidate = extract_json(text);
    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| LlmError::Parse(format!("{} in {:?}", e, excerpt(candidate))))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(LlmError::Parse(format!(
            "expected a JSON object, got {:?}",
            excerpt(candidate)
        )))
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        text.to_string()
    } else {
        let head: String = text.chars().take(EXCERPT_LEN).collect();
        format!("{}...", head)
    }
}
