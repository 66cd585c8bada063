//! Error types for the todo API client.
//!
//! # Design
//! Three failure families reach callers through one `ClientError` value:
//! the server sent a payload that does not match its contract (`Validation`),
//! the server rejected the request (`Api`, carrying the normalized
//! `ApiError`), or no response arrived at all (`Network`). Only the API
//! variant carries a machine-readable code and field-level messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::SchemaError;

/// Machine-readable error category reported by the server.
///
/// Codes outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    BadRequest,
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    RateLimited,
    InternalError,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "BAD_REQUEST" => ErrorCode::BadRequest,
            "VALIDATION_ERROR" => ErrorCode::ValidationError,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NOT_FOUND" => ErrorCode::NotFound,
            "CONFLICT" => ErrorCode::Conflict,
            "RATE_LIMITED" => ErrorCode::RateLimited,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            _ => ErrorCode::Other(code),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server-reported (or synthesized) API failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Correlation id the server attached to the failed request.
    pub request_id: Option<String>,
    /// Field name to validation message, keyed by input property names.
    pub fields: Option<BTreeMap<String, String>>,
}

impl ApiError {
    /// The synthetic error used when a failed response carries no usable
    /// error envelope.
    pub fn fallback(status: u16) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: format!("Request failed with status {status}"),
            request_id: None,
            fields: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.as_ref()?.get(name).map(String::as_str)
    }
}

/// Errors returned by the request builder, the parsers and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server answered with a payload that violates the wire contract.
    #[error(transparent)]
    Validation(#[from] SchemaError),

    /// The server rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request descriptor could not be built.
    #[error("invalid request: {0}")]
    Request(String),
}

impl ClientError {
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            ClientError::Api(err) => Some(&err.code),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ClientError::Api(err) => err.fields.as_ref(),
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            ClientError::Api(err) => err.request_id.as_deref(),
            _ => None,
        }
    }

    /// Malformed payloads are deployment bugs; retrying cannot fix them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Api(_) | ClientError::Network(_))
    }

    /// Human-readable message, or `fallback` when the failure carries none.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_roundtrip_through_strings() {
        for raw in ["NOT_FOUND", "VALIDATION_ERROR", "INTERNAL_ERROR", "RATE_LIMITED"] {
            let code = ErrorCode::from(raw.to_string());
            assert!(!matches!(code, ErrorCode::Other(_)), "{raw}");
            assert_eq!(String::from(code), raw);
        }
    }

    #[test]
    fn unknown_codes_are_kept_verbatim() {
        let code: ErrorCode = serde_json::from_str(r#""TEAPOT""#).unwrap();
        assert_eq!(code, ErrorCode::Other("TEAPOT".to_string()));
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""TEAPOT""#);
    }

    #[test]
    fn fallback_names_the_status() {
        let err = ApiError::fallback(502);
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "Request failed with status 502");
        assert!(err.request_id.is_none());
        assert!(err.fields.is_none());
    }

    #[test]
    fn api_error_displays_its_message() {
        let err = ClientError::from(ApiError {
            code: ErrorCode::NotFound,
            message: "Todo not found".to_string(),
            request_id: Some("req-1".to_string()),
            fields: None,
        });
        assert_eq!(err.to_string(), "Todo not found");
        assert_eq!(err.code(), Some(&ErrorCode::NotFound));
        assert_eq!(err.request_id(), Some("req-1"));
        assert!(err.is_retryable());
    }

    #[test]
    fn empty_message_uses_fallback() {
        let err = ClientError::from(ApiError {
            code: ErrorCode::InternalError,
            message: String::new(),
            request_id: None,
            fields: None,
        });
        assert_eq!(err.message_or("Failed to create todo"), "Failed to create todo");

        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.message_or("unused"), "network error: connection refused");
        assert!(err.code().is_none());
        assert!(err.fields().is_none());
    }

    #[test]
    fn field_lookup() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), "Title is required".to_string());
        let err = ApiError {
            code: ErrorCode::ValidationError,
            message: "Invalid request body".to_string(),
            request_id: None,
            fields: Some(fields),
        };
        assert_eq!(err.field("title"), Some("Title is required"));
        assert_eq!(err.field("completed"), None);
    }
}
