//! API Response types
//!
//! The restaurant backend wraps most payloads as:
//! ```json
//! { "ok": true, "data": ..., "message": "..." }
//! ```
//! but not uniformly: some endpoints return the payload bare, some omit
//! `ok`. The helpers here normalise that.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unified API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Business success flag, absent on some endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// Response data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    #[serde(default, alias = "mensaje", alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            ok: Some(true),
            data: Some(data),
            message: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: Some(false),
            data: None,
            message: Some(message.into()),
        }
    }

    /// `ok: false` explicitly reported by the backend
    pub fn is_rejected(&self) -> bool {
        self.ok == Some(false)
    }
}

/// Why a list payload could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListShape {
    /// `ok` was explicitly false (or missing when required)
    NotOk,
    /// `data` missing or not an array
    NotArray,
}

/// Extract the `data` array of a list response.
///
/// With `require_ok` the envelope must carry `ok: true`, as the invoice and
/// user listings do. Element deserialization errors are returned as-is.
pub fn list_data<T: DeserializeOwned>(
    body: Value,
    require_ok: bool,
) -> Result<Result<Vec<T>, ListShape>, serde_json::Error> {
    let ok = body.get("ok").and_then(Value::as_bool);
    if require_ok && ok != Some(true) {
        return Ok(Err(ListShape::NotOk));
    }
    if ok == Some(false) {
        return Ok(Err(ListShape::NotOk));
    }

    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map(Ok),
            _ => Ok(Err(ListShape::NotArray)),
        },
        _ => Ok(Err(ListShape::NotArray)),
    }
}

/// Deserialize a payload that may or may not be wrapped in `data`.
pub fn unwrap_data<T: DeserializeOwned>(body: Value) -> Result<T, serde_json::Error> {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            let data = map.remove("data").unwrap_or(Value::Null);
            serde_json::from_value(data)
        }
        other => serde_json::from_value(other),
    }
}

/// `message` field of an error body, if any
pub fn message_of(body: &Value) -> Option<String> {
    ["message", "mensaje", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
