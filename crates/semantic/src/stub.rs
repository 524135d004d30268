use fxhash::hash64;

use crate::encoder::TextEncoder;
use crate::{SemanticError, TokenEmbeddings};

const BOS: &str = "<s>";
const EOS: &str = "</s>";

/// Deterministic encoder used in `stub` mode or when the model assets are unavailable.
///
/// Every whitespace-separated token maps to a pseudo-random vector seeded by a hash of
/// the token, framed by `<s>`/`</s>` rows the way a RoBERTa-style encoder frames its
/// input. Shared words therefore produce shared rows, which keeps similarity meaningful
/// without any model weights.
#[derive(Debug, Clone)]
pub struct StubEncoder {
    dim: usize,
    max_sequence_length: usize,
}

impl StubEncoder {
    pub fn new(dim: usize, max_sequence_length: usize) -> Self {
        Self {
            dim,
            max_sequence_length,
        }
    }
}

impl TextEncoder for StubEncoder {
    fn encode(&self, text: &str) -> Result<TokenEmbeddings, SemanticError> {
        // Two slots are reserved for the framing rows.
        let word_budget = self.max_sequence_length.saturating_sub(2);
        let mut rows = Vec::new();
        rows.push(token_vector(BOS, self.dim));
        for word in text.split_whitespace().take(word_budget) {
            rows.push(token_vector(word, self.dim));
        }
        rows.push(token_vector(EOS, self.dim));
        TokenEmbeddings::from_rows(rows, self.dim)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// splitmix64 stream seeded by the token hash, mapped to `[-1, 1)`.
fn token_vector(token: &str, dim: usize) -> Vec<f32> {
    let mut state = hash64(token.as_bytes());
    (0..dim)
        .map(|_| {
            state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
            (unit * 2.0 - 1.0) as f32
        })
        .collect()
}
