//! Fast tier: Jaccard similarity over word k-shingles.
//!
//! Shingles are hashed with a seeded rolling polynomial hash in O(n) over
//! the token stream. Documents too short to form a single k-shingle drop to
//! unigram sets so one-word inputs still compare.

use fxhash::FxHashSet;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::normalize::tokenize;
use crate::provider::bounded_score;
use crate::{Fidelity, SimilarityError, SimilarityProvider};

/// SplitMix64 finalizer, used to derive the rolling-hash base from the seed.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash every k-window of `tokens` into a set. Empty if `k == 0` or `tokens.len() < k`.
pub(crate) fn shingle_set<S: AsRef<str>>(tokens: &[S], k: usize, seed: u64) -> FxHashSet<u64> {
    let n = tokens.len();
    let mut out = FxHashSet::default();
    if k == 0 || n < k {
        return out;
    }

    let th: Vec<u64> = tokens
        .iter()
        .map(|t| xxh3_64_with_seed(t.as_ref().as_bytes(), seed))
        .collect();

    const BASE: u64 = 1_000_003;
    let base = BASE ^ splitmix64(seed);

    // base^(k-1) drops the oldest token from the window.
    let mut base_km1 = 1u64;
    for _ in 1..k {
        base_km1 = base_km1.wrapping_mul(base);
    }

    let mut h = 0u64;
    for &val in th.iter().take(k) {
        h = h.wrapping_mul(base).wrapping_add(val);
    }
    out.insert(h);

    for (&old, &new) in th.iter().zip(th.iter().skip(k)) {
        h = h.wrapping_sub(old.wrapping_mul(base_km1));
        h = h.wrapping_mul(base).wrapping_add(new);
        out.insert(h);
    }
    out
}

fn jaccard(a: &FxHashSet<u64>, b: &FxHashSet<u64>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    inter as f32 / union as f32
}

/// Low-fidelity provider: shingle-set Jaccard.
#[derive(Debug, Clone)]
pub struct ShingleSimilarity {
    k: usize,
    seed: u64,
}

impl ShingleSimilarity {
    pub fn new(k: usize, seed: u64) -> Self {
        Self { k: k.max(1), seed }
    }
}

impl SimilarityProvider for ShingleSimilarity {
    fn fidelity(&self) -> Fidelity {
        Fidelity::Fast
    }

    fn name(&self) -> &'static str {
        "shingle-jaccard"
    }

    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, SimilarityError> {
        let ta = tokenize(text_a);
        let tb = tokenize(text_b);

        // Both sides must use the same shingle width or the sets never meet.
        let k = if ta.len() < self.k || tb.len() < self.k {
            1
        } else {
            self.k
        };

        let sa = shingle_set(&ta, k, self.seed);
        let sb = shingle_set(&tb, k, self.seed);
        bounded_score(jaccard(&sa, &sb))
    }
}
