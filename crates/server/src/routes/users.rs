use crate::error::{ServerError, ServerResult};
use crate::routes::{parse_payload, record_request};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use simdoc::status;
use std::sync::Arc;

const ENDPOINT: &str = "register";

/// Successful registration body
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Status Code")]
    pub status_code: u16,
    pub username: String,
    pub tokens: u64,
}

/// Create a user (POST /register).
///
/// Body: `{"username": "...", "password": "..."}`. The new user starts with
/// the configured token grant.
pub async fn register(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<RegisterResponse>> {
    let payload = parse_payload(&body);
    let service = Arc::clone(&state.service);

    let outcome: ServerResult<_> = tokio::task::spawn_blocking(move || service.register(&payload))
        .await
        .map_err(ServerError::from)
        .and_then(|res| res.map_err(ServerError::from));

    record_request(
        ENDPOINT,
        outcome.as_ref().map_or_else(ServerError::status_code, |_| status::OK),
    );
    let registration = outcome?;

    Ok(Json(RegisterResponse {
        message: "User registered successfully".to_string(),
        status_code: status::OK,
        username: registration.username,
        tokens: registration.tokens,
    }))
}
