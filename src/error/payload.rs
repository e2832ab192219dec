//! Structured error bodies returned by the API.
//!
//! Accepted shapes:
//! - `{"message": "...", "code": "...", "details": ...}`
//! - `{"error": {"message": "...", "code": "...", "details": ...}}`
//! - `{"error": "..."}`
//! - `{"detail": "..."}`, `{"detail": {...}}`, `{"detail": [...]}`

use serde_json::{Map, Value};

/// Fields recovered from a failed response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorPayload {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<Value>,
}

impl ErrorPayload {
    /// Parse a response body. Returns `None` unless the body is a JSON
    /// object with at least one recognizable field.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let object = value.as_object()?;

        let payload = match object.get("error") {
            Some(Value::Object(inner)) => Self::from_fields(inner),
            Some(Value::String(message)) => Self {
                message: Some(message.clone()),
                ..Self::from_fields(object)
            },
            _ => match object.get("detail") {
                Some(detail) => Self::from_detail(detail, object),
                None => Self::from_fields(object),
            },
        };

        if payload == Self::default() {
            None
        } else {
            Some(payload)
        }
    }

    fn from_fields(object: &Map<String, Value>) -> Self {
        Self {
            message: string_field(object, "message"),
            code: string_field(object, "code"),
            details: object.get("details").filter(|v| !v.is_null()).cloned(),
        }
    }

    fn from_detail(detail: &Value, object: &Map<String, Value>) -> Self {
        match detail {
            Value::String(message) => Self {
                message: Some(message.clone()),
                ..Self::from_fields(object)
            },
            Value::Object(inner) => {
                let mut payload = Self::from_fields(inner);
                if payload.details.is_none() {
                    payload.details = Some(detail.clone());
                }
                payload
            }
            // Validation error lists: keep the list, first entry's `msg` as message.
            Value::Array(items) => Self {
                message: items
                    .first()
                    .and_then(|item| item.get("msg"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                code: string_field(object, "code"),
                details: Some(detail.clone()),
            },
            _ => Self::from_fields(object),
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
