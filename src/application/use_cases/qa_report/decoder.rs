use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::literal::parse_literal;
use crate::infrastructure::response::{clean_llm_response, preview_text};

/// First `[` through the last `]`, across newlines.
static BRACKETED_SEQUENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Best-effort decoding of a stage's raw output.
///
/// Tries, in order: strict JSON of the whole reply, a literal reading of the
/// whole reply, then the same two readings of the first bracketed sequence in
/// it. Every failure path ends in an empty sequence; this never errors.
///
/// The result is always an array or an object: a top-level `null` becomes an
/// empty array and a top-level scalar becomes a one-element array.
pub fn decode(text: &str) -> Value {
    let cleaned = clean_llm_response(text);
    if cleaned.is_empty() {
        return Value::Array(Vec::new());
    }

    if let Some(value) = parse_candidate(&cleaned) {
        return into_container(value);
    }

    if let Some(found) = BRACKETED_SEQUENCE.find(&cleaned) {
        if let Some(value) = parse_candidate(found.as_str()) {
            tracing::debug!(
                offset = found.start(),
                "decoded bracketed sequence embedded in prose"
            );
            return into_container(value);
        }
    }

    tracing::debug!(
        output = %preview_text(&cleaned, 200),
        "stage output is not structured; treating as empty"
    );
    Value::Array(Vec::new())
}

fn parse_candidate(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .or_else(|| parse_literal(candidate).ok())
}

fn into_container(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(_) | Value::Object(_) => value,
        scalar => Value::Array(vec![scalar]),
    }
}
