use serde_json::Value;

use super::{flatten_rows, result_of};

/// Two-column `field,value` CSV of the result object.
pub fn render_csv(value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    let mut rows = Vec::new();
    flatten_rows("", result_of(value), &mut rows);

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["field", "value"])?;
    for (field, val) in &rows {
        wtr.write_record([field, val])?;
    }
    wtr.flush()?;

    let bytes = wtr.into_inner().map_err(|e| e.to_string())?;
    let mut out = String::from_utf8(bytes)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
