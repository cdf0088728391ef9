use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::normalizer::render_value;
use crate::domain::error::{AppError, Result};

pub const DEFAULT_ACTION_VERBS: &[&str] = &[
    "Enter", "Click", "Verify", "Select", "Login", "Open", "Submit", "Navigate", "Type", "Upload",
];

/// `1.` / `2)` at the very start of a step.
static LEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s*").unwrap());

/// A marker left dangling at the end of a segment, on its own line, which
/// belongs to the next step.
static TRAILING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\n)[ \t]*\d+[.)][ \t]*$").unwrap());

/// A line opening with its own `1.` / `2)` marker.
static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)](?:[ \t]|$)").unwrap());

/// Renders a test case's `steps` field as numbered lines.
///
/// Text that already numbers its lines keeps those steps and is renumbered.
/// Other free text is cut in front of each configured action verb, so a
/// paragraph like "Enter username Click submit" becomes two numbered steps.
#[derive(Debug, Clone)]
pub struct StepSegmenter {
    boundary: Regex,
}

impl Default for StepSegmenter {
    fn default() -> Self {
        Self::with_verbs(DEFAULT_ACTION_VERBS).expect("default action verbs form a valid pattern")
    }
}

impl StepSegmenter {
    pub fn with_verbs<S: AsRef<str>>(verbs: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = verbs
            .iter()
            .map(|verb| verb.as_ref().trim())
            .filter(|verb| !verb.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Err(AppError::ConfigError(
                "At least one step action verb is required".to_string(),
            ));
        }
        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        let boundary = Regex::new(&pattern)
            .map_err(|e| AppError::ConfigError(format!("Invalid step verbs: {}", e)))?;
        Ok(Self { boundary })
    }

    pub fn normalize_steps(&self, raw: &Value) -> String {
        match raw {
            Value::Null => String::new(),
            Value::Array(steps) => number_steps(steps.iter().map(step_text)),
            Value::Object(_) => step_text(raw),
            Value::String(text) => self.normalize_text(text),
            scalar => render_value(scalar),
        }
    }

    fn normalize_text(&self, text: &str) -> String {
        let segments = self.segment(text);
        if segments.len() > 1 {
            number_steps(segments.into_iter())
        } else {
            text.to_string()
        }
    }

    /// Splits step text into individual steps. Two or more numbered lines
    /// mark the steps themselves; otherwise the text is cut in front of every
    /// action verb. Text before the first cut is kept as its own segment
    /// unless it is only a numbering marker.
    pub fn segment(&self, text: &str) -> Vec<String> {
        split_numbered_lines(text).unwrap_or_else(|| self.split_on_verbs(text))
    }

    fn split_on_verbs(&self, text: &str) -> Vec<String> {
        let mut cuts: Vec<usize> = self.boundary.find_iter(text).map(|m| m.start()).collect();
        if cuts.first() != Some(&0) {
            cuts.insert(0, 0);
        }
        cuts.push(text.len());

        cuts.windows(2)
            .map(|bounds| clean_segment(&text[bounds[0]..bounds[1]]))
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

/// Unnumbered lines stay with the numbered line above them.
fn split_numbered_lines(text: &str) -> Option<Vec<String>> {
    let mut cuts: Vec<usize> = NUMBERED_LINE.find_iter(text).map(|m| m.start()).collect();
    if cuts.len() < 2 {
        return None;
    }
    if cuts[0] != 0 {
        cuts.insert(0, 0);
    }
    cuts.push(text.len());

    Some(
        cuts.windows(2)
            .map(|bounds| {
                LEADING_MARKER
                    .replace(text[bounds[0]..bounds[1]].trim(), "")
                    .trim()
                    .to_string()
            })
            .filter(|segment| !segment.is_empty())
            .collect(),
    )
}

fn clean_segment(segment: &str) -> String {
    let trimmed = segment.trim_end();
    let without_trailing = TRAILING_MARKER.replace(trimmed, "");
    let without_leading = LEADING_MARKER.replace(&without_trailing, "");
    without_leading
        .trim()
        .trim_end_matches([',', ';'])
        .trim_end()
        .to_string()
}

fn step_text(step: &Value) -> String {
    let text = match step {
        Value::Object(map) => map
            .get("step")
            .map(render_value)
            .unwrap_or_else(|| step.to_string()),
        other => render_value(other),
    };
    LEADING_MARKER.replace(text.trim(), "").to_string()
}

fn number_steps(steps: impl Iterator<Item = String>) -> String {
    steps
        .enumerate()
        .map(|(index, step)| format!("{}. {}", index + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_of_strings_is_numbered() {
        let segmenter = StepSegmenter::default();
        let steps = json!(["Enter username", "Click submit"]);
        assert_eq!(
            segmenter.normalize_steps(&steps),
            "1. Enter username\n2. Click submit"
        );
    }

    #[test]
    fn test_numbered_text_round_trips() {
        let segmenter = StepSegmenter::default();
        let rendered = segmenter.normalize_steps(&json!(["Enter username", "Click submit"]));
        assert_eq!(
            segmenter.segment(&rendered),
            vec!["Enter username".to_string(), "Click submit".to_string()]
        );
        assert_eq!(segmenter.normalize_steps(&json!(rendered.clone())), rendered);
    }

    #[test]
    fn test_numbered_text_with_verb_mid_step_round_trips() {
        let segmenter = StepSegmenter::default();
        let rendered = segmenter.normalize_steps(&json!([
            "Open the form",
            "Ensure the Submit button is disabled"
        ]));
        assert_eq!(rendered, "1. Open the form\n2. Ensure the Submit button is disabled");
        assert_eq!(
            segmenter.segment(&rendered),
            vec![
                "Open the form".to_string(),
                "Ensure the Submit button is disabled".to_string()
            ]
        );
        assert_eq!(segmenter.normalize_steps(&json!(rendered.clone())), rendered);
    }

    #[test]
    fn test_numbered_lines_are_renumbered() {
        let segmenter = StepSegmenter::default();
        let text = json!("Preconditions: account exists\n3) Open the app\n   with a slow network\n7) Click Login and Verify the spinner");
        assert_eq!(
            segmenter.normalize_steps(&text),
            "1. Preconditions: account exists\n2. Open the app\n   with a slow network\n3. Click Login and Verify the spinner"
        );
    }

    #[test]
    fn test_list_of_mappings_uses_step_field() {
        let segmenter = StepSegmenter::default();
        let steps = json!([{"step": "Open login page"}, {"action": "tap"}, "3. Verify banner"]);
        assert_eq!(
            segmenter.normalize_steps(&steps),
            "1. Open login page\n2. {\"action\":\"tap\"}\n3. Verify banner"
        );
    }

    #[test]
    fn test_single_mapping() {
        let segmenter = StepSegmenter::default();
        assert_eq!(
            segmenter.normalize_steps(&json!({"step": "Open the app"})),
            "Open the app"
        );
    }

    #[test]
    fn test_paragraph_is_split_on_action_verbs() {
        let segmenter = StepSegmenter::default();
        let text = json!("Open the login page, Enter a wrong password three times Verify OTP is requested");
        assert_eq!(
            segmenter.normalize_steps(&text),
            "1. Open the login page\n2. Enter a wrong password three times\n3. Verify OTP is requested"
        );
    }

    #[test]
    fn test_leading_context_is_kept() {
        let segmenter = StepSegmenter::default();
        let text = json!("As a locked user: Click login. Verify error shown.");
        assert_eq!(
            segmenter.normalize_steps(&text),
            "1. As a locked user:\n2. Click login.\n3. Verify error shown."
        );
    }

    #[test]
    fn test_single_clause_is_returned_unchanged() {
        let segmenter = StepSegmenter::default();
        let text = json!("  Enter valid credentials  ");
        assert_eq!(segmenter.normalize_steps(&text), "  Enter valid credentials  ");
        assert_eq!(
            segmenter.normalize_steps(&json!("no verbs here")),
            "no verbs here"
        );
    }

    #[test]
    fn test_verbs_match_whole_words_only() {
        let segmenter = StepSegmenter::default();
        let text = json!("Entering data Clicks nothing");
        assert_eq!(segmenter.normalize_steps(&text), "Entering data Clicks nothing");
    }

    #[test]
    fn test_custom_verbs() {
        let segmenter = StepSegmenter::with_verbs(&["User", "System"]).unwrap();
        let text = json!("User submits form System shows receipt");
        assert_eq!(
            segmenter.normalize_steps(&text),
            "1. User submits form\n2. System shows receipt"
        );
        assert!(StepSegmenter::with_verbs::<&str>(&[]).is_err());
        assert!(StepSegmenter::with_verbs(&["  "]).is_err());
    }

    #[test]
    fn test_empty_and_scalar_steps() {
        let segmenter = StepSegmenter::default();
        assert_eq!(segmenter.normalize_steps(&Value::Null), "");
        assert_eq!(segmenter.normalize_steps(&json!([])), "");
        assert_eq!(segmenter.normalize_steps(&json!(3)), "3");
    }
}
