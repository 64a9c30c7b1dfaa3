/// Failures when decoding a persisted record into a model type.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    /// Neither ISO-8601 nor integer epoch seconds.
    #[error("malformed timestamp \"{0}\"")]
    MalformedTimestamp(String),

    #[error("amount is not numeric: {0}")]
    InvalidAmount(String),

    /// The record boundary was handed something other than a JSON object.
    #[error("expected an expense object, got {0}")]
    NotAnExpense(&'static str),

    #[error("field \"{field}\" has the wrong type: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Name of the JSON type, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
