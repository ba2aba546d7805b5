//! Display Text Helpers
//!
//! Normalization, truncation, line budgets and secret redaction shared by
//! every summarizer. Order matters: text is normalized first and truncated
//! second, so the length limit applies to what is actually shown.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Appended to a truncated line.
pub const ELLIPSIS: char = '…';

/// Replacement shown instead of a sensitive value.
pub const REDACTED: &str = "***";

/// Keys whose values never reach the canvas.
static SENSITIVE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)password|passwd|secret|token|apikey|api_key|authorization")
        .expect("sensitive key pattern is a valid regex")
});

/// Collapses every whitespace run to one space and trims both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to `max_len` characters and appends an ellipsis.
///
/// Trailing whitespace left by the cut is trimmed before the ellipsis, so a
/// truncated line is at most `max_len + 1` characters long.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_len).collect();
    let mut line = cut.trim_end().to_string();
    line.push(ELLIPSIS);
    line
}

/// Normalizes then truncates.
pub fn clean(text: &str, max_len: usize) -> String {
    truncate(&normalize(text), max_len)
}

/// Limits `lines` to `budget` entries.
///
/// When there are more lines than the budget, the last kept line becomes
/// `+N more` where `N` is the number of lines over budget.
pub fn fit_budget(mut lines: Vec<String>, budget: usize) -> Vec<String> {
    if budget == 0 || lines.len() <= budget {
        return lines;
    }

    let overflow = lines.len() - budget;
    lines.truncate(budget - 1);
    lines.push(format!("+{} more", overflow));
    lines
}

/// Joins up to `limit` items with `", "`, adding a `+N more` tail.
pub fn join_limited<S: AsRef<str>>(items: &[S], limit: usize) -> String {
    let mut parts: Vec<String> = items
        .iter()
        .take(limit)
        .map(|s| s.as_ref().to_string())
        .collect();
    if items.len() > limit {
        parts.push(format!("+{} more", items.len() - limit));
    }
    parts.join(", ")
}

/// Appends ` (+N)` when `total` exceeds one.
pub fn with_extra_count(first: &str, total: usize) -> String {
    if total > 1 {
        format!("{} (+{})", first, total - 1)
    } else {
        first.to_string()
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY.is_match(key)
}

/// Returns a copy of `value` with every sensitive key's value replaced.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(key, inner)| {
                    let inner = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_value(inner)
                    };
                    (key.clone(), inner)
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::String(text) => Value::String(redact_text(text)),
        other => other.clone(),
    }
}

/// Redacts a string that carries a JSON object or array.
///
/// Plain strings pass through unchanged.
pub fn redact_text(text: &str) -> String {
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return text.to_string();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string(&redact_value(&parsed)).unwrap_or_else(|_| REDACTED.to_string())
        }
        _ => text.to_string(),
    }
}

/// Renders a value for inline display with secrets removed.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => redact_text(text),
        Value::Null => String::new(),
        other => serde_json::to_string(&redact_value(other)).unwrap_or_default(),
    }
}

/// Renders `key=value`, hiding the value when the key is sensitive.
pub fn key_value(key: &str, value: &Value) -> String {
    if is_sensitive_key(key) {
        format!("{}={}", key, REDACTED)
    } else {
        format!("{}={}", key, render_value(value))
    }
}
