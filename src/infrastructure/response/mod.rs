use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static INTERNAL_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<internal>[\s\S]*?</internal>").unwrap());

/// Removes reasoning blocks some models prepend to their answer.
///
/// These blocks often quote the BRD or sketch arrays of their own, which would
/// otherwise be picked up by the bracket fallback of the decoder.
pub fn clean_llm_response(response: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(response, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    let cleaned = INTERNAL_TAG_PATTERN.replace_all(&cleaned, "");
    strip_code_fence(&cleaned)
}

/// Unwraps a reply that is entirely one fenced block (```json ... ```).
pub fn strip_code_fence(value: &str) -> String {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim()
            .trim_end_matches("```")
            .trim()
            .to_string(),
        None => trimmed.to_string(),
    }
}

/// Shortens model output for log lines.
pub fn preview_text(value: &str, max_chars: usize) -> String {
    let mut out: String = value.chars().take(max_chars).collect();
    if value.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}
