//! Reduces failure values of any shape to a single [`ErrorRecord`].
//!
//! Normalization never fails. Values that do not look like an error object
//! (no string `message`) become a record with the best message we can render
//! and the `Unknown` type.

use serde_json::{Map, Value};

use super::types::ErrorRecord;
use crate::model::RawError;

/// Type label for payloads that could not be interpreted
pub const UNKNOWN_ERROR_TYPE: &str = "Unknown";

const GENERIC_ERROR_TYPE: &str = "Error";
const ASSERTION_ERROR_TYPE: &str = "AssertionError";

pub fn normalize(raw: &RawError) -> ErrorRecord {
    match raw {
        RawError::Error {
            error_type,
            message,
            stack,
        } => ErrorRecord {
            error_type: if error_type.trim().is_empty() {
                GENERIC_ERROR_TYPE.to_string()
            } else {
                error_type.clone()
            },
            message: message.clone(),
            stack_trace: stack.clone(),
            expected: None,
            actual: None,
        },
        RawError::Assertion {
            message,
            expected,
            actual,
            stack,
        } => ErrorRecord {
            error_type: ASSERTION_ERROR_TYPE.to_string(),
            message: message.clone(),
            stack_trace: stack.clone(),
            expected: expected.as_ref().map(value_text),
            actual: actual.as_ref().map(value_text),
        },
        RawError::Opaque(Value::Object(fields)) => normalize_object(fields),
        RawError::Opaque(other) => unknown(value_text(other)),
    }
}

fn normalize_object(fields: &Map<String, Value>) -> ErrorRecord {
    let Some(message) = string_field(fields, &["message"]) else {
        return unknown(Value::Object(fields.clone()).to_string());
    };

    let expected = fields.get("expected").map(value_text);
    let actual = fields.get("actual").map(value_text);

    let error_type = string_field(fields, &["name", "type", "errorType"])
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(if expected.is_some() || actual.is_some() {
            ASSERTION_ERROR_TYPE
        } else {
            GENERIC_ERROR_TYPE
        });

    ErrorRecord {
        error_type: error_type.to_string(),
        message: message.to_string(),
        stack_trace: string_field(fields, &["stack", "stackTrace"]).map(str::to_string),
        expected,
        actual,
    }
}

fn unknown(message: String) -> ErrorRecord {
    tracing::warn!(%message, "error payload has no recognizable shape");
    ErrorRecord {
        error_type: UNKNOWN_ERROR_TYPE.to_string(),
        message,
        stack_trace: None,
        expected: None,
        actual: None,
    }
}

fn string_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
}

/// Strings verbatim, anything else as compact JSON
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
