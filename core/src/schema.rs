//! Boundary validators, one per wire shape.
//!
//! # Design
//! Each validator is a pure function from a parsed JSON value to a typed
//! result. Structure and field types are checked by serde; constraints serde
//! cannot express (non-empty ids and titles) are checked afterwards. Unknown
//! keys are ignored, matching how the server is allowed to grow its payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{ApiError, ErrorCode};
use crate::types::{Todo, TodoList};

/// The wire shape a payload was validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Todo,
    TodoList,
    ErrorEnvelope,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Todo => f.write_str("todo"),
            Shape::TodoList => f.write_str("todo list"),
            Shape::ErrorEnvelope => f.write_str("error envelope"),
        }
    }
}

/// A payload did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {shape} payload: {message}")]
pub struct SchemaError {
    pub shape: Shape,
    pub message: String,
}

impl SchemaError {
    fn new(shape: Shape, message: impl Into<String>) -> Self {
        Self {
            shape,
            message: message.into(),
        }
    }
}

/// `{ "error": { ... } }` as sent with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl From<ErrorBody> for ApiError {
    fn from(body: ErrorBody) -> Self {
        ApiError {
            code: body.code,
            message: body.message,
            request_id: body.request_id,
            fields: body.fields,
        }
    }
}

#[derive(Deserialize)]
struct TodoEnvelope {
    data: Todo,
}

/// Parse a response body as JSON, attributing failures to `shape`.
pub fn parse_json(shape: Shape, body: &str) -> Result<Value, SchemaError> {
    serde_json::from_str(body).map_err(|e| SchemaError::new(shape, e.to_string()))
}

/// Validate a bare todo object.
pub fn validate_todo(value: Value) -> Result<Todo, SchemaError> {
    let todo: Todo = decode(Shape::Todo, value)?;
    check_todo(Shape::Todo, &todo)?;
    Ok(todo)
}

/// Validate a single-todo envelope, `{ "data": Todo }`.
pub fn validate_todo_envelope(value: Value) -> Result<Todo, SchemaError> {
    let envelope: TodoEnvelope = decode(Shape::Todo, value)?;
    check_todo(Shape::Todo, &envelope.data)?;
    Ok(envelope.data)
}

/// Validate a list response, `{ "data": Todo[], "meta": { "total": n } }`.
///
/// `meta.total` is not compared with the item count here.
pub fn validate_todo_list(value: Value) -> Result<TodoList, SchemaError> {
    let list: TodoList = decode(Shape::TodoList, value)?;
    for todo in &list.data {
        check_todo(Shape::TodoList, todo)?;
    }
    Ok(list)
}

pub fn validate_error_envelope(value: Value) -> Result<ErrorEnvelope, SchemaError> {
    decode(Shape::ErrorEnvelope, value)
}

fn decode<T: DeserializeOwned>(shape: Shape, value: Value) -> Result<T, SchemaError> {
    serde_json::from_value(value).map_err(|e| SchemaError::new(shape, e.to_string()))
}

fn check_todo(shape: Shape, todo: &Todo) -> Result<(), SchemaError> {
    if todo.id.as_str().is_empty() {
        return Err(SchemaError::new(shape, "todo id is empty"));
    }
    if todo.title.is_empty() {
        return Err(SchemaError::new(
            shape,
            format!("todo {} has an empty title", todo.id),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn todo_envelope_is_unwrapped() {
        let todo = validate_todo_envelope(json!({
            "data": { "id": "abc123", "title": "Buy milk", "completed": false }
        }))
        .unwrap();
        assert_eq!(todo.id.as_str(), "abc123");
        assert_eq!(todo.title, "Buy milk");
    }

    #[test]
    fn bare_todo_is_rejected_as_envelope() {
        let err = validate_todo_envelope(json!({
            "id": "abc123", "title": "Buy milk", "completed": false
        }))
        .unwrap_err();
        assert_eq!(err.shape, Shape::Todo);
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let err = validate_todo(json!({ "id": "a", "title": "t", "completed": "yes" })).unwrap_err();
        assert_eq!(err.shape, Shape::Todo);
        assert!(err.to_string().starts_with("malformed todo payload"));
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = validate_todo(json!({ "id": "a", "title": "", "completed": false })).unwrap_err();
        assert!(err.message.contains("empty title"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let todo = validate_todo(json!({
            "id": "a", "title": "t", "completed": true, "createdAt": "2024-01-01"
        }))
        .unwrap();
        assert!(todo.completed);
    }

    #[test]
    fn list_requires_meta() {
        let err = validate_todo_list(json!({ "data": [] })).unwrap_err();
        assert_eq!(err.shape, Shape::TodoList);

        let list = validate_todo_list(json!({ "data": [], "meta": { "total": 0 } })).unwrap();
        assert!(list.data.is_empty());
    }

    #[test]
    fn list_items_are_checked() {
        let err = validate_todo_list(json!({
            "data": [{ "id": "", "title": "t", "completed": false }],
            "meta": { "total": 1 }
        }))
        .unwrap_err();
        assert_eq!(err.shape, Shape::TodoList);
    }

    #[test]
    fn error_envelope_optional_parts() {
        let envelope = validate_error_envelope(json!({
            "error": { "code": "NOT_FOUND", "message": "Todo not found" }
        }))
        .unwrap();
        assert_eq!(envelope.error.code, ErrorCode::NotFound);
        assert!(envelope.error.request_id.is_none());
        assert!(envelope.error.fields.is_none());

        let envelope = validate_error_envelope(json!({
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "Invalid request body",
                "requestId": "req-9",
                "fields": { "title": "Title is required" }
            }
        }))
        .unwrap();
        assert_eq!(envelope.error.request_id.as_deref(), Some("req-9"));
        let api: ApiError = envelope.error.into();
        assert_eq!(api.field("title"), Some("Title is required"));
    }

    #[test]
    fn error_envelope_requires_message() {
        assert!(validate_error_envelope(json!({ "error": { "code": "NOT_FOUND" } })).is_err());
        assert!(validate_error_envelope(json!({ "message": "nope" })).is_err());
    }

    #[test]
    fn parse_json_reports_shape() {
        let err = parse_json(Shape::TodoList, "not json").unwrap_err();
        assert_eq!(err.shape, Shape::TodoList);
    }
}
