//! Turning API error bodies into one human-readable line.
//!
//! Error bodies come in several shapes. Each shape has an extractor; callers
//! pass the ordered list of extractors that applies to their endpoint and the
//! first one that recognizes the body wins. When none does, the raw body text
//! is reported together with the status code.

use reqwest::StatusCode;
use serde_json::Value;

/// Pulls a message out of a parsed error body, or declines with `None`.
pub type Extractor = fn(&Value) -> Option<String>;

/// Validation failures: `{"errors": [{"message": "..."}, ...]}`, joined with `"; "`.
pub fn sub_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<&str> = errors
        .iter()
        .map(|e| {
            e.get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
        })
        .collect();
    Some(messages.join("; "))
}

/// The common `{"message": "..."}` shape.
///
/// A `message` that is not a string (`null`, a number, an object) does not
/// count, so the raw-body fallback applies.
pub fn top_level_message(body: &Value) -> Option<String> {
    body.get("message")?.as_str().map(String::from)
}

/// Repository creation reports field validation problems as sub-errors.
pub const CREATE_STRATEGIES: &[Extractor] = &[sub_errors, top_level_message];

pub const DEFAULT_STRATEGIES: &[Extractor] = &[top_level_message];

/// Describe a failed response.
pub fn describe_failure(status: StatusCode, body: &str, strategies: &[Extractor]) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body)
        && let Some(message) = strategies.iter().find_map(|extract| extract(&parsed))
    {
        return format!("API request failed: {}", message);
    }
    format!(
        "API request failed with status {}: {}",
        status.as_u16(),
        body
    )
}
