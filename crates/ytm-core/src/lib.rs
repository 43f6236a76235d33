pub mod error;
pub mod fixed_income;
pub mod types;

pub use error::YtmError;
pub use types::*;

/// Standard result type for all ytm operations
pub type YtmResult<T> = Result<T, YtmError>;
