use serde_json::Value;

/// Pretty-printed JSON of the whole envelope.
pub fn render_json(value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}
