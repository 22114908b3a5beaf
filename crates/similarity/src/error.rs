use thiserror::Error;

/// Errors surfaced by similarity providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// Provider parameters are out of range.
    #[error("invalid similarity config: {0}")]
    InvalidConfig(String),
    /// The model produced no usable score.
    #[error("inference failure: {0}")]
    Inference(String),
}
