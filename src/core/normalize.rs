//! Typed coercion of the string sentinels CloudTrail Lake returns for every leaf value.

use crate::domain::model::Row;
use serde_json::Value;

/// Rewrites `""` and `"null"` to null and `"true"`/`"false"` to booleans, recursing
/// through arrays and objects. Every other value is returned unchanged.
pub fn normalize(mut value: Value) -> Value {
    normalize_in_place(&mut value);
    value
}

pub fn normalize_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => map.values_mut().for_each(normalize_in_place),
        Value::Array(items) => items.iter_mut().for_each(normalize_in_place),
        Value::String(s) => {
            let coerced = match s.as_str() {
                "" | "null" => Value::Null,
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return,
            };
            *value = coerced;
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

pub fn normalize_row(row: &mut Row) {
    row.values_mut().for_each(normalize_in_place);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_sentinels() {
        assert_eq!(normalize(json!("")), Value::Null);
        assert_eq!(normalize(json!("null")), Value::Null);
        assert_eq!(normalize(json!("true")), json!(true));
        assert_eq!(normalize(json!("false")), json!(false));
        assert_eq!(normalize(json!("hello")), json!("hello"));
        assert_eq!(normalize(json!(42)), json!(42));
        assert_eq!(normalize(Value::Null), Value::Null);
    }

    #[test]
    fn test_sentinels_are_case_sensitive() {
        assert_eq!(normalize(json!("True")), json!("True"));
        assert_eq!(normalize(json!("NULL")), json!("NULL"));
        assert_eq!(normalize(json!(" ")), json!(" "));
    }

    #[test]
    fn test_nested_containers() {
        let value = json!({"a": "true", "b": ["false", ""], "c": {"d": ["null", 1, "x"]}});
        assert_eq!(
            normalize(value),
            json!({"a": true, "b": [false, null], "c": {"d": [null, 1, "x"]}})
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = vec![
            json!(""),
            json!("false"),
            json!({"a": ["true", {"b": ""}], "c": 3.5}),
            json!([["null"], [], {}]),
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(once.clone()), once);
        }
    }

    #[test]
    fn test_normalize_row_keeps_column_order() {
        let mut row = Row::new();
        row.insert("eventName".to_string(), json!("ConsoleLogin"));
        row.insert("readOnly".to_string(), json!("true"));
        row.insert("errorCode".to_string(), json!(""));

        normalize_row(&mut row);

        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["eventName", "readOnly", "errorCode"]);
        assert_eq!(row["readOnly"], json!(true));
        assert_eq!(row["errorCode"], Value::Null);
    }
}
