//! Salvages a JSON object from free-form model text.
//!
//! Fence markers are removed and the greedy span
//! from the first `{` to the last `}` is parsed. It assumes one object is
//! embedded in the text; several JSON fragments, or unbalanced braces inside
//! string values, can still mis-extract. Shape validation happens elsewhere.

use serde::de::DeserializeOwned;

use crate::error::{AssessmentError, Result};

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims the result.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Greedy first-`{`-to-last-`}` span, or `None` when no such span exists.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Cleans model output down to the text that should be parsed.
pub fn clean_json_output(raw: &str) -> String {
    let defenced = strip_code_fences(raw);
    match extract_json_span(&defenced) {
        Some(span) => span.to_string(),
        None => defenced,
    }
}

pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = clean_json_output(raw);
    serde_json::from_str(&cleaned).map_err(|e| AssessmentError::malformed_json(e.to_string(), raw))
}
