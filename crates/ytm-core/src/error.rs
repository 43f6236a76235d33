use thiserror::Error;

#[derive(Debug, Error)]
pub enum YtmError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Numerical overflow in {context}")]
    NumericalOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for YtmError {
    fn from(e: serde_json::Error) -> Self {
        YtmError::SerializationError(e.to_string())
    }
}
