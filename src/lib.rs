//! Workspace umbrella crate for simdoc, a metered document-similarity service.
//!
//! This crate stitches the credential store, the authorization gate and the
//! similarity providers into one [`ComparisonService`] so transports (the
//! HTTP server, tests, embedding applications) call a single entry point per
//! operation.

pub mod config;

pub use auth::{
    status, validate_credentials_shape, validate_payload_shape, AuthError, AuthorizationGate,
    Authorized, Credentials, Documents, PasswordConfig, PasswordVerifier, Registration,
    DEFAULT_INITIAL_TOKENS,
};
pub use config::{ConfigLoadError, SimdocConfig, StoreBackendKind, StoreConfig};
pub use similarity::{
    EmbeddingSimilarity, Fidelity, ProviderSet, ShingleSimilarity, SimilarityConfig,
    SimilarityError, SimilarityProvider,
};
pub use store::{
    BackendConfig, ChargeOutcome, CredentialStore, InMemoryStore, StoreError, UserRecord,
};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while serving a request through the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("similarity provider failure: {0}")]
    Similarity(#[from] SimilarityError),
}

impl ServiceError {
    /// Wire code for this failure. Provider failures are collaborator failures.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Auth(err) => err.status_code(),
            ServiceError::Similarity(_) => status::INTERNAL,
        }
    }
}

/// A completed, paid comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub username: String,
    /// Balance after this request's charge.
    pub tokens_remaining: u64,
    /// Score in `[0, 1]`.
    pub similarity: f32,
    pub fidelity: Fidelity,
}

impl Comparison {
    /// Human-readable summary, `"[<tokens>] Similarity: <score>"`.
    pub fn message(&self) -> String {
        format!("[{}] Similarity: {}", self.tokens_remaining, self.similarity)
    }
}

/// Registration and paid comparisons over injected collaborators.
///
/// Construct once at startup (see [`SimdocConfig::build_service`]) and share
/// behind an `Arc`. All methods are blocking: password hashing and scoring are
/// CPU-bound, so async callers should run them on a blocking pool.
#[derive(Debug)]
pub struct ComparisonService {
    gate: AuthorizationGate,
    providers: ProviderSet,
}

impl ComparisonService {
    pub fn new(gate: AuthorizationGate, providers: ProviderSet) -> Self {
        Self { gate, providers }
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    /// Create a user from a `{"username", "password"}` payload.
    pub fn register(&self, payload: &Value) -> Result<Registration, ServiceError> {
        Ok(self.gate.register(payload)?)
    }

    /// Gate, charge, then score `doc1` against `doc2` on the chosen tier.
    ///
    /// The token is spent once the gate passes. A provider failure after that
    /// point is reported but not refunded.
    pub fn compare(
        &self,
        payload: &Value,
        fidelity: Fidelity,
    ) -> Result<Comparison, ServiceError> {
        let authorized = self.gate.authorize_paid(payload, Documents::from_payload)?;
        let provider = self.providers.get(fidelity);

        let similarity = provider
            .similarity(&authorized.payload.doc1, &authorized.payload.doc2)
            .inspect_err(|err| {
                tracing::error!(
                    username = %authorized.username,
                    provider = provider.name(),
                    error = %err,
                    "similarity provider failed after charge"
                );
            })?;

        tracing::debug!(
            username = %authorized.username,
            %fidelity,
            similarity,
            tokens_remaining = authorized.tokens_remaining,
            "comparison complete"
        );

        Ok(Comparison {
            username: authorized.username,
            tokens_remaining: authorized.tokens_remaining,
            similarity,
            fidelity,
        })
    }
}
