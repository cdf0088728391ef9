use serde_json::{Map, Value};

use super::literal::parse_literal;

/// Coerces a decoded value of unknown shape into "zero or more items".
///
/// Empty values (`null`, `""`, `[]`, `{}`) yield nothing, a mapping or a
/// string is wrapped, a sequence is returned as-is and any other scalar is
/// wrapped as its string form. Applying it twice changes nothing.
pub fn normalize_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::String(text) if text.is_empty() => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Object(map) if map.is_empty() => Vec::new(),
        Value::Object(_) | Value::String(_) => vec![value.clone()],
        scalar => vec![Value::String(scalar.to_string())],
    }
}

/// One normalized element, viewed by what the report can do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Mapping(Map<String, Value>),
    Scalar(String),
}

impl Item {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Item::Mapping(map),
            other => Item::Scalar(render_value(&other)),
        }
    }

    /// A string field by key, empty when absent.
    pub fn field(&self, key: &str) -> String {
        match self {
            Item::Mapping(map) => map.get(key).map(render_value).unwrap_or_default(),
            Item::Scalar(_) => String::new(),
        }
    }
}

/// Renders any value as cell text: strings verbatim, `null` as empty and
/// everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Expands items that carry a whole JSON array inside a string.
///
/// A string starting with `[` is parsed as a sequence and its elements take
/// its place (one level only). Anything that cannot be expanded is kept as a
/// single item so the datum still reaches the report.
pub fn splice_encoded_lists(items: Vec<Value>) -> Vec<Item> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(text) if text.trim_start().starts_with('[') => {
                match parse_encoded_list(text.trim()) {
                    Some(elements) => out.extend(elements.into_iter().map(Item::from_value)),
                    None => {
                        tracing::warn!("encoded list could not be parsed; keeping raw text");
                        out.push(Item::Scalar(text));
                    }
                }
            }
            other => out.push(Item::from_value(other)),
        }
    }
    out
}

fn parse_encoded_list(text: &str) -> Option<Vec<Value>> {
    let parsed = serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| parse_literal(text).ok())?;
    match parsed {
        Value::Array(elements) => Some(elements),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shapes() -> Vec<Value> {
        vec![
            Value::Null,
            json!(""),
            json!([]),
            json!({}),
            json!("just a plain sentence"),
            json!({"id": "TS1"}),
            json!([{"id": "TS1"}, "loose", 3]),
            json!(42),
            json!(true),
            json!([[1, 2]]),
        ]
    }

    #[test]
    fn test_normalize_list_shapes() {
        assert!(normalize_list(&Value::Null).is_empty());
        assert!(normalize_list(&json!("")).is_empty());
        assert!(normalize_list(&json!({})).is_empty());
        assert_eq!(normalize_list(&json!({"id": "TS1"})), vec![json!({"id": "TS1"})]);
        assert_eq!(
            normalize_list(&json!("just a plain sentence")),
            vec![json!("just a plain sentence")]
        );
        assert_eq!(normalize_list(&json!([1, "a"])), vec![json!(1), json!("a")]);
        assert_eq!(normalize_list(&json!(7.5)), vec![json!("7.5")]);
    }

    #[test]
    fn test_normalize_list_is_idempotent() {
        for shape in shapes() {
            let once = normalize_list(&shape);
            let twice = normalize_list(&Value::Array(once.clone()));
            assert_eq!(once, twice, "shape {}", shape);
        }
    }

    #[test]
    fn test_item_fields_render_as_strings() {
        let item = Item::from_value(json!({
            "id": 7,
            "scenario": "Lockout",
            "tags": ["auth", "otp"],
            "owner": null
        }));
        assert_eq!(item.field("id"), "7");
        assert_eq!(item.field("scenario"), "Lockout");
        assert_eq!(item.field("tags"), r#"["auth","otp"]"#);
        assert_eq!(item.field("owner"), "");
        assert_eq!(item.field("missing"), "");
    }

    #[test]
    fn test_scalar_item_has_no_fields() {
        let item = Item::from_value(json!("free text"));
        assert_eq!(item, Item::Scalar("free text".to_string()));
        assert_eq!(item.field("id"), "");
    }

    #[test]
    fn test_splice_expands_encoded_lists() {
        let items = vec![
            json!("[{'module': 'Login', 'description': 'Auth'}, {'module': 'OTP'}]"),
            json!({"module": "Reports"}),
        ];
        let spliced = splice_encoded_lists(items);
        assert_eq!(spliced.len(), 3);
        assert_eq!(spliced[0].field("module"), "Login");
        assert_eq!(spliced[1].field("module"), "OTP");
        assert_eq!(spliced[2].field("module"), "Reports");
    }

    #[test]
    fn test_splice_keeps_unparseable_and_plain_strings() {
        let items = vec![json!("[not a list"), json!("a remark")];
        let spliced = splice_encoded_lists(items);
        assert_eq!(
            spliced,
            vec![
                Item::Scalar("[not a list".to_string()),
                Item::Scalar("a remark".to_string())
            ]
        );
    }
}
