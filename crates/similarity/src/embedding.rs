//! Accurate tier: cosine similarity over hashed feature vectors.
//!
//! Each document is projected into a fixed-width vector with the hashing
//! trick. Features are word unigrams, adjacent word bigrams and character
//! n-grams of each word (padded with `#` so prefixes and suffixes count).
//! Char grams carry half weight. Counts get sublinear TF (`1 + ln tf`) and
//! the vector is L2-normalized, so cosine is a plain dot product.

use fxhash::hash64;

use crate::normalize::{dot, l2_normalize_in_place, tokenize};
use crate::provider::bounded_score;
use crate::{Fidelity, SimilarityError, SimilarityProvider};

const WORD: u8 = 0;
const BIGRAM: u8 = 1;
const CHAR_GRAM: u8 = 2;
const CHAR_GRAM_WEIGHT: f32 = 0.5;

/// High-fidelity provider: hashed bag-of-features cosine.
#[derive(Debug, Clone)]
pub struct EmbeddingSimilarity {
    dim: usize,
    char_ngram: usize,
}

impl EmbeddingSimilarity {
    pub fn new(dim: usize, char_ngram: usize) -> Self {
        Self {
            dim: dim.max(1),
            char_ngram,
        }
    }

    /// Unit-length (or all-zero, for empty text) embedding of `text`.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        let mut v = vec![0f32; self.dim];
        let slot = |h: u64| (h % self.dim as u64) as usize;

        for token in &tokens {
            v[slot(hash64(&(WORD, token.as_str())))] += 1.0;
        }
        for pair in tokens.windows(2) {
            v[slot(hash64(&(BIGRAM, pair[0].as_str(), pair[1].as_str())))] += 1.0;
        }
        if self.char_ngram >= 2 {
            for token in &tokens {
                let padded: Vec<char> = std::iter::once('#')
                    .chain(token.chars())
                    .chain(std::iter::once('#'))
                    .collect();
                if padded.len() <= self.char_ngram {
                    v[slot(hash64(&(CHAR_GRAM, &padded[..])))] += CHAR_GRAM_WEIGHT;
                    continue;
                }
                for gram in padded.windows(self.char_ngram) {
                    v[slot(hash64(&(CHAR_GRAM, gram)))] += CHAR_GRAM_WEIGHT;
                }
            }
        }

        for x in v.iter_mut() {
            if *x > 0.0 {
                *x = 1.0 + x.ln();
            }
        }
        l2_normalize_in_place(&mut v);
        v
    }
}

impl SimilarityProvider for EmbeddingSimilarity {
    fn fidelity(&self) -> Fidelity {
        Fidelity::Accurate
    }

    fn name(&self) -> &'static str {
        "hashed-embedding-cosine"
    }

    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, SimilarityError> {
        let a = self.embed(text_a);
        let b = self.embed(text_b);
        bounded_score(dot(&a, &b))
    }
}
