//! Turns non-2xx responses into `ApiError` values.
//!
//! The body is parsed as JSON and validated as an error envelope. Any failure
//! along the way (empty body, invalid JSON, wrong shape) yields the synthetic
//! `INTERNAL_ERROR` fallback instead, so a failed response always produces a
//! normalized error.

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::schema::{self, Shape};

/// Normalize a failed response. Never fails itself.
pub fn normalize_error(response: &HttpResponse) -> ApiError {
    let envelope = schema::parse_json(Shape::ErrorEnvelope, &response.body)
        .and_then(schema::validate_error_envelope);

    match envelope {
        Ok(envelope) => envelope.error.into(),
        Err(err) => {
            tracing::debug!(
                status = response.status,
                reason = %err,
                "error response without a usable envelope, using fallback"
            );
            ApiError::fallback(response.status)
        }
    }
}

/// `Ok` for 2xx responses, the normalized error otherwise.
pub fn ensure_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(normalize_error(response))
    }
}
