use serde::{Deserialize, Serialize};

use crate::SimilarityError;

/// Tuning knobs for both provider tiers.
///
/// ```yaml
/// similarity:
///   shingle_size: 2
///   seed: 1732584193
///   embedding_dim: 1024
///   char_ngram: 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Words per shingle for the fast tier.
    pub shingle_size: usize,
    /// Seed for shingle hashing. Changing it changes nothing about scores
    /// beyond collision patterns.
    pub seed: u64,
    /// Width of the hashed feature vector for the accurate tier.
    pub embedding_dim: usize,
    /// Character n-gram length for the accurate tier; 0 disables char grams.
    pub char_ngram: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            shingle_size: 2,
            seed: 0x6745_2301,
            embedding_dim: 1024,
            char_ngram: 3,
        }
    }
}

impl SimilarityConfig {
    pub fn validate(&self) -> Result<(), SimilarityError> {
        if self.shingle_size == 0 {
            return Err(SimilarityError::InvalidConfig(
                "shingle_size must be >= 1".into(),
            ));
        }
        if self.embedding_dim < 16 {
            return Err(SimilarityError::InvalidConfig(format!(
                "embedding_dim must be >= 16, got {}",
                self.embedding_dim
            )));
        }
        if self.char_ngram == 1 {
            return Err(SimilarityError::InvalidConfig(
                "char_ngram must be 0 (disabled) or >= 2".into(),
            ));
        }
        Ok(())
    }
}
