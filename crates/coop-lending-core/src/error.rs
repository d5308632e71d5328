use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoopLendingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unaffordable loan: {0}")]
    Unaffordable(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoopLendingError {
    fn from(e: serde_json::Error) -> Self {
        CoopLendingError::SerializationError(e.to_string())
    }
}
