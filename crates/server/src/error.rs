use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use simdoc::{status, ServiceError};

pub type ServerResult<T> = Result<T, ServerError>;

const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// `Status Code` for the unmatched-route fallback.
pub const NOT_FOUND: u16 = 404;

/// `Status Code` for a request that exceeded the server timeout.
pub const TIMEOUT: u16 = 408;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Request timed out; a token may already have been charged")]
    Timeout,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Status Code")]
    pub status_code: u16,
}

/// HTTP status carried alongside a taxonomy code.
///
/// Every gate outcome is a successful exchange at the HTTP level; clients
/// read the result from `Status Code`. Only the 404 fallback, timeouts and
/// collaborator failures use a non-200 status.
pub fn http_status_for(code: u16) -> StatusCode {
    match code {
        status::OK
        | status::MISSING_FIELD
        | status::WRONG_TYPE
        | status::USER_EXISTS
        | status::UNKNOWN_USER
        | status::BAD_PASSWORD
        | status::INSUFFICIENT_TOKENS => StatusCode::OK,
        NOT_FOUND => StatusCode::NOT_FOUND,
        TIMEOUT => StatusCode::REQUEST_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    /// Taxonomy code reported in the `Status Code` field.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::Service(err) => err.status_code(),
            ServerError::NotFound => NOT_FOUND,
            ServerError::Timeout => TIMEOUT,
            ServerError::Internal(_) | ServerError::Config(_) => status::INTERNAL,
        }
    }

    /// Client-facing message. Collaborator failures never leak detail.
    fn public_message(&self) -> String {
        match self.status_code() {
            status::INTERNAL => GENERIC_INTERNAL_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        match code {
            status::INTERNAL => tracing::error!(error = %self, "request failed"),
            TIMEOUT => tracing::warn!("request timed out"),
            _ => {}
        }

        let body = Json(ErrorResponse {
            message: self.public_message(),
            status_code: code,
        });

        (http_status_for(code), body).into_response()
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("blocking task failed: {err}"))
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<simdoc::ConfigLoadError> for ServerError {
    fn from(err: simdoc::ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdoc::AuthError;

    fn code_of(err: AuthError) -> (u16, StatusCode) {
        let err = ServerError::from(ServiceError::from(err));
        let code = err.status_code();
        (code, err.into_response().status())
    }

    #[test]
    fn taxonomy_codes_travel_with_http_ok() {
        assert_eq!(
            code_of(AuthError::MissingField("username".into())),
            (301, StatusCode::OK)
        );
        assert_eq!(
            code_of(AuthError::WrongType("password".into())),
            (302, StatusCode::OK)
        );
        assert_eq!(code_of(AuthError::UserAlreadyExists), (303, StatusCode::OK));
        assert_eq!(code_of(AuthError::UnknownUser), (310, StatusCode::OK));
        assert_eq!(code_of(AuthError::BadPassword), (311, StatusCode::OK));
        assert_eq!(code_of(AuthError::InsufficientTokens), (330, StatusCode::OK));
    }

    #[test]
    fn non_taxonomy_failures_keep_http_status() {
        assert_eq!(
            code_of(AuthError::Hashing("boom".into())),
            (500, StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(
            ServerError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        let timeout = ServerError::Timeout;
        assert_eq!(timeout.status_code(), 408);
        assert_eq!(timeout.into_response().status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ServerError::Internal("disk on fire".into());
        assert_eq!(err.public_message(), GENERIC_INTERNAL_MESSAGE);
        assert_eq!(ServerError::NotFound.public_message(), "Not found");
    }
}
