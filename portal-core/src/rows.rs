//! Helpers for reading loosely typed rows coming back from the backend.
//!
//! Rows are plain JSON objects whose column names vary between tables and
//! schema generations, so every logical field is resolved through an ordered
//! list of candidate keys.

use serde_json::{Map, Value};

/// A single backend row.
pub type Row = Map<String, Value>;

/// First key holding a string with non-blank content. The string is returned
/// untrimmed.
pub fn pick_string<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| match row.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    })
}

/// First key that is present and not `null`, whatever its shape.
pub fn pick_first<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| row.get(*key).filter(|value| !value.is_null()))
}

/// First key with a usable scalar value. Blank strings are skipped, numbers
/// and booleans are rendered to text.
pub fn read_row_value(row: Option<&Row>, keys: &[&str]) -> Option<String> {
    let row = row?;
    for key in keys {
        match row.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(Value::Bool(b)) => return Some(b.to_string()),
            _ => continue,
        }
    }
    None
}

pub fn has_row_change(old: Option<&Row>, new: Option<&Row>, keys: &[&str]) -> bool {
    read_row_value(old, keys) != read_row_value(new, keys)
}

/// Renders a JSON value the way the backend's JavaScript clients stringify
/// ids and timestamps.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// JavaScript truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Borrow the value as an object, if it is one.
pub fn as_row(value: Option<&Value>) -> Option<&Row> {
    value.and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn pick_string_skips_blank_and_non_string_values() {
        let r = row(json!({ "a": "  ", "b": 4, "c": " value " }));
        assert_eq!(pick_string(&r, &["a", "b", "c"]), Some(" value "));
        assert_eq!(pick_string(&r, &["a", "b"]), None);
    }

    #[test]
    fn pick_first_stops_at_first_non_null() {
        let r = row(json!({ "a": null, "b": "", "c": "x" }));
        assert_eq!(pick_first(&r, &["a", "b", "c"]), Some(&json!("")));
    }

    #[test]
    fn read_row_value_renders_scalars() {
        assert_eq!(read_row_value(None, &["a"]), None);
        assert_eq!(read_row_value(Some(&row(json!({ "a": "  " }))), &["a"]), None);
        assert_eq!(
            read_row_value(Some(&row(json!({ "a": "value" }))), &["a"]),
            Some("value".to_string())
        );
        assert_eq!(
            read_row_value(Some(&row(json!({ "a": 1 }))), &["a"]),
            Some("1".to_string())
        );
        assert_eq!(
            read_row_value(Some(&row(json!({ "a": false }))), &["a"]),
            Some("false".to_string())
        );
    }

    #[test]
    fn has_row_change_compares_resolved_values() {
        let x = row(json!({ "a": "x" }));
        let y = row(json!({ "a": "y" }));
        assert!(!has_row_change(Some(&x), Some(&x), &["a"]));
        assert!(has_row_change(Some(&x), Some(&y), &["a"]));
        assert!(has_row_change(None, Some(&y), &["a"]));
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("no")));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn value_to_string_matches_js_rendering() {
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!("abc")), "abc");
        assert_eq!(value_to_string(&json!(true)), "true");
    }
}
