pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Render a computation envelope in the requested format.
pub fn render(format: &OutputFormat, value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => json::render_json(value),
        OutputFormat::Table => Ok(table::render_table(value)),
        OutputFormat::Csv => csv_out::render_csv(value),
        OutputFormat::Minimal => Ok(minimal::render_minimal(value)),
    }
}

/// The `result` object of an envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted `field.sub` rows.
pub(crate) fn flatten_rows(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_rows(&name, val, rows);
            }
        }
        _ => rows.push((prefix.to_string(), format_scalar(value))),
    }
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_rows_dots_nested_keys() {
        let mut rows = Vec::new();
        flatten_rows(
            "",
            &json!({"ytm": "0.05", "outcome": {"status": "converged", "iterations": 3}}),
            &mut rows,
        );
        assert!(rows.contains(&("ytm".into(), "0.05".into())));
        assert!(rows.contains(&("outcome.status".into(), "converged".into())));
        assert!(rows.contains(&("outcome.iterations".into(), "3".into())));
    }

    #[test]
    fn test_result_of_unwraps_envelope() {
        let env = json!({"result": {"price": "100"}, "warnings": []});
        assert_eq!(result_of(&env), &json!({"price": "100"}));
        let bare = json!({"price": "100"});
        assert_eq!(result_of(&bare), &bare);
    }
}
