use crate::error::{ServerError, ServerResult};
use crate::routes::{parse_payload, record_request};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use simdoc::{status, Fidelity, ServiceError};
use std::sync::Arc;

/// Successful comparison body
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    /// `"[<tokens>] Similarity: <score>"`
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Status Code")]
    pub status_code: u16,
    /// Balance after this request's charge
    pub tokens: u64,
    pub similarity: f32,
    pub fidelity: Fidelity,
}

/// Fast, low-fidelity comparison (POST /compare_s).
pub async fn compare_fast(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<CompareResponse>> {
    compare(state, body, Fidelity::Fast, "compare_s").await
}

/// Accurate, high-fidelity comparison (POST /compare_l).
pub async fn compare_accurate(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<CompareResponse>> {
    compare(state, body, Fidelity::Accurate, "compare_l").await
}

async fn compare(
    state: Arc<ServerState>,
    body: Bytes,
    fidelity: Fidelity,
    endpoint: &'static str,
) -> ServerResult<Json<CompareResponse>> {
    let payload = parse_payload(&body);
    let service = Arc::clone(&state.service);

    let outcome: ServerResult<_> =
        tokio::task::spawn_blocking(move || service.compare(&payload, fidelity))
            .await
            .map_err(ServerError::from)
            .and_then(|res| res.map_err(ServerError::from));

    record_request(
        endpoint,
        outcome.as_ref().map_or_else(ServerError::status_code, |_| status::OK),
    );
    // Provider failures happen after the charge.
    if matches!(
        outcome,
        Ok(_) | Err(ServerError::Service(ServiceError::Similarity(_)))
    ) {
        metrics::counter!("simdoc_tokens_charged_total", "fidelity" => fidelity.as_str())
            .increment(1);
    }
    let comparison = outcome?;

    Ok(Json(CompareResponse {
        message: comparison.message(),
        status_code: status::OK,
        tokens: comparison.tokens_remaining,
        similarity: comparison.similarity,
        fidelity: comparison.fidelity,
    }))
}
