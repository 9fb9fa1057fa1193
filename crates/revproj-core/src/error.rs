use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Missing revenue data for {year}")]
    MissingYearData { year: i32 },

    #[error("Invalid assumption: {field} — {reason}")]
    InvalidAssumption { field: String, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Parse error: {field} = '{value}' — {reason}")]
    ParseError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ProjectionError {
    fn from(e: serde_json::Error) -> Self {
        ProjectionError::SerializationError(e.to_string())
    }
}
