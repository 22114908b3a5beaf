use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "simdoc-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Probes the credential store; 503 when it cannot be read.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> Response {
    let service = Arc::clone(&state.service);
    let backend = service.gate().store().backend_name();
    let probe =
        tokio::task::spawn_blocking(move || service.gate().store().user_count()).await;

    let (code, status, users) = match probe {
        Ok(Ok(count)) => (StatusCode::OK, "ready", Some(count)),
        Ok(Err(err)) => {
            tracing::warn!(backend, error = %err, "store not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", None)
        }
        Err(err) => {
            tracing::warn!(backend, error = %err, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", None)
        }
    };

    let body = Json(json!({
        "status": status,
        "service": "simdoc-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": {
                "backend": backend,
                "status": status,
                "users": users,
            },
        }
    }));
    (code, body).into_response()
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let handle = state.metrics.as_ref().ok_or(ServerError::NotFound)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}
