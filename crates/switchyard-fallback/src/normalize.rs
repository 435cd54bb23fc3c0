// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Label schema and response normalization.
//!
//! Backends answer in several shapes: a JSON object under one of a few
//! keys, a JSON string, a fenced code block, or a bare word. Everything is
//! reduced here to one normalized label, or `None` when the content does
//! not name an allowed label.

use serde_json::{json, Value};
use switchyard_core::normalize_label;

/// Label the model returns when no category fits.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Object keys accepted as carrying the label, in lookup order.
const LABEL_KEYS: [&str; 4] = ["label", "category", "pred", "prediction"];

/// The `response_format` payload restricting output to the category enum.
pub fn label_schema(categories: &[String]) -> Value {
    let mut labels: Vec<String> = categories.iter().map(|c| normalize_label(c)).collect();
    labels.push(UNKNOWN_LABEL.to_string());

    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "NewsLabel",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "label": {
                        "oneOf": [
                            {"type": "string", "enum": labels},
                            {"type": "null"}
                        ]
                    }
                },
                "required": ["label"],
                "additionalProperties": false
            }
        }
    })
}

/// Extracts a normalized label from raw model output.
///
/// A JSON `null` label maps to [`UNKNOWN_LABEL`]. Returns `None` when the
/// content is unparseable or names a label outside `categories`.
pub fn normalize_content(content: &str, categories: &[String]) -> Option<String> {
    let body = strip_code_fence(content.trim());

    let candidate = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match LABEL_KEYS.iter().find_map(|k| map.get(*k)) {
            Some(Value::String(s)) => normalize_label(s),
            Some(Value::Null) => UNKNOWN_LABEL.to_string(),
            _ => return None,
        },
        Ok(Value::String(s)) => normalize_label(&s),
        Ok(_) => return None,
        Err(_) => bare_label(body)?,
    };

    let allowed = candidate == UNKNOWN_LABEL
        || categories.iter().any(|c| normalize_label(c) == candidate);
    allowed.then_some(candidate)
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// A single word, optionally quoted or followed by punctuation.
fn bare_label(body: &str) -> Option<String> {
    let word = body
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace());
    if word.is_empty() || word.contains(char::is_whitespace) || word.contains(['{', '}']) {
        return None;
    }
    Some(normalize_label(word))
}
