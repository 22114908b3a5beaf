//! API route handlers
//!
//! - `health`: liveness, readiness and metrics
//! - `users`: registration
//! - `compare`: paid similarity comparisons (fast and accurate)

pub mod compare;
pub mod health;
pub mod users;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

/// API version and base info
///
/// Returns server information and the available endpoints (GET /).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "simdoc server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/register",
            "/compare_s",
            "/compare_l",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Parse a request body. Anything that is not JSON becomes `null`, which the
/// schema checks treat as a payload with no fields.
pub(crate) fn parse_payload(body: &[u8]) -> Value {
    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "unparseable request body");
            Value::Null
        }
    }
}

pub(crate) fn record_request(endpoint: &'static str, code: u16) {
    metrics::counter!(
        "simdoc_requests_total",
        "endpoint" => endpoint,
        "status" => code.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_body_is_null() {
        assert_eq!(parse_payload(b"{not json"), Value::Null);
        assert_eq!(parse_payload(b""), Value::Null);
        assert_eq!(parse_payload(br#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_payload(b"[1, 2]"), json!([1, 2]));
    }
}
