use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{EmbeddingSimilarity, ShingleSimilarity, SimilarityConfig, SimilarityError};

/// Which provider tier a comparison runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    /// Lower fidelity, cheaper.
    Fast,
    /// Higher fidelity, slower.
    Accurate,
}

impl Fidelity {
    pub fn as_str(self) -> &'static str {
        match self {
            Fidelity::Fast => "fast",
            Fidelity::Accurate => "accurate",
        }
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text similarity model.
///
/// Implementations must be pure with respect to their inputs and return a
/// finite score in `[0, 1]`.
pub trait SimilarityProvider: Send + Sync {
    fn fidelity(&self) -> Fidelity;

    /// Human-readable model label for logs.
    fn name(&self) -> &'static str;

    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, SimilarityError>;
}

/// Clamp a raw model score into `[0, 1]`, rejecting NaN.
pub(crate) fn bounded_score(raw: f32) -> Result<f32, SimilarityError> {
    if raw.is_nan() {
        return Err(SimilarityError::Inference("model produced NaN".into()));
    }
    if !(0.0..=1.0).contains(&raw) {
        tracing::trace!(raw, "score outside [0, 1], clamping");
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// One provider per [`Fidelity`], built once at startup and shared.
#[derive(Clone)]
pub struct ProviderSet {
    fast: Arc<dyn SimilarityProvider>,
    accurate: Arc<dyn SimilarityProvider>,
}

impl ProviderSet {
    pub fn new(fast: Arc<dyn SimilarityProvider>, accurate: Arc<dyn SimilarityProvider>) -> Self {
        Self { fast, accurate }
    }

    /// Build the bundled shingle and embedding providers.
    pub fn from_config(cfg: &SimilarityConfig) -> Result<Self, SimilarityError> {
        cfg.validate()?;
        Ok(Self::new(
            Arc::new(ShingleSimilarity::new(cfg.shingle_size, cfg.seed)),
            Arc::new(EmbeddingSimilarity::new(cfg.embedding_dim, cfg.char_ngram)),
        ))
    }

    pub fn get(&self, fidelity: Fidelity) -> &dyn SimilarityProvider {
        match fidelity {
            Fidelity::Fast => self.fast.as_ref(),
            Fidelity::Accurate => self.accurate.as_ref(),
        }
    }
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSet")
            .field("fast", &self.fast.name())
            .field("accurate", &self.accurate.name())
            .finish()
    }
}
