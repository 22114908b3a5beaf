//! simdoc similarity providers
//!
//! Turns two pieces of text into one score in `[0, 1]`. The service treats
//! this as an opaque collaborator; all it sees is [`SimilarityProvider`].
//!
//! Two tiers ship here, both deterministic and asset-free:
//!
//! - **Fast** ([`ShingleSimilarity`]) - Jaccard over hashed word shingles.
//!   Cheap, catches verbatim overlap, blind to paraphrase.
//! - **Accurate** ([`EmbeddingSimilarity`]) - cosine over hashed
//!   word/bigram/char-gram vectors. Slower, tolerant of inflection and
//!   reordering.
//!
//! ```
//! use similarity::{Fidelity, ProviderSet, SimilarityConfig};
//!
//! let providers = ProviderSet::from_config(&SimilarityConfig::default()).unwrap();
//! let score = providers
//!     .get(Fidelity::Accurate)
//!     .similarity("the cat sat", "a cat sat down")
//!     .unwrap();
//! assert!((0.0..=1.0).contains(&score));
//! ```

pub mod config;
pub mod error;

mod embedding;
mod normalize;
mod provider;
mod shingles;

pub use config::SimilarityConfig;
pub use embedding::EmbeddingSimilarity;
pub use error::SimilarityError;
pub use normalize::tokenize;
pub use provider::{Fidelity, ProviderSet, SimilarityProvider};
pub use shingles::ShingleSimilarity;
