//! Structural checks on a decoded status payload.

use serde_json::Value;

use crate::error::PollError;

const HOMEWORKS: &str = "homeworks";
const CURRENT_DATE: &str = "current_date";

/// One homework entry as returned by the server. Fields are checked later by
/// the status parser, so the raw value is kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedRecord(Value);

impl TrackedRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// A string field, `None` if absent or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Check the payload shape and return its records in server order.
pub fn validate(payload: &Value) -> Result<Vec<TrackedRecord>, PollError> {
    tracing::debug!("Validating API response");

    let Some(object) = payload.as_object() else {
        return Err(PollError::Shape(format!(
            "ожидался объект, получено {}",
            kind_of(payload)
        )));
    };

    for key in [HOMEWORKS, CURRENT_DATE] {
        if !object.contains_key(key) {
            return Err(PollError::Shape(format!("отсутствует ключ {key}")));
        }
    }

    let Some(homeworks) = object.get(HOMEWORKS).and_then(Value::as_array) else {
        return Err(PollError::Shape(format!(
            "{HOMEWORKS} не является списком ({})",
            kind_of(&object[HOMEWORKS])
        )));
    };

    Ok(homeworks.iter().cloned().map(TrackedRecord::new).collect())
}

/// The next cursor value, if the server sent an integer one.
///
/// A `current_date` of any other type leaves the cursor where it was, with a
/// warning since that means the upstream contract changed.
pub fn cursor_of(payload: &Value) -> Option<i64> {
    let value = payload.get(CURRENT_DATE)?;
    let cursor = value.as_i64();
    if cursor.is_none() {
        tracing::warn!(
            current_date = %value,
            "{CURRENT_DATE} is {}, not an integer; cursor not advanced",
            kind_of(value)
        );
    }
    cursor
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
