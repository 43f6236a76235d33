use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_rows, result_of};

/// Two-column field/value table of the result, followed by any warnings
/// and the methodology line from the envelope.
pub fn render_table(value: &Value) -> String {
    let mut rows = Vec::new();
    flatten_rows("", result_of(value), &mut rows);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, val) in &rows {
        builder.push_record([field.as_str(), val.as_str()]);
    }
    let mut out = Table::from(builder).to_string();

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\n\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("\n  - {w}"));
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        out.push_str(&format!("\n\nMethodology: {meth}"));
    }

    out
}
