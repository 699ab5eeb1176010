//! # Proof Envelope
//!
//! The wallet ships a Groth16 proof as one opaque byte string: the ABI
//! encoding of the static tuple
//!
//! ```text
//! (uint256[2] a, uint256[2][2] b, uint256[2] c, uint256[N] input)
//! ```
//!
//! Every member is static, so the encoding is just `8 + N` big-endian
//! 32-byte words laid end to end, no offsets, no length prefixes. That makes
//! the decoder trivially strict: the byte length must be exactly
//! `(8 + N) * 32`, and anything else is garbage.
//!
//! `b` is stored the way the EVM pairing precompile wants it, which is
//! with the two Fq2 coefficients swapped (`[x.c1, x.c0]`). The envelope keeps
//! the words as-is; [`super::proof_system`] deals with the swap.

use alloy_primitives::{Bytes, U256};
use thiserror::Error;

/// Size of one ABI word.
pub const WORD_SIZE: usize = 32;

/// Words taken by the `a`, `b` and `c` curve points.
pub const POINT_WORDS: usize = 8;

/// Errors raised while decoding proof bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The byte string has the wrong length for the expected input count.
    #[error("proof data is {actual} bytes, expected {expected} ({inputs} public inputs)")]
    InvalidLength {
        expected: usize,
        actual: usize,
        inputs: usize,
    },
}

/// A decoded Groth16 proof plus its public inputs, all as raw 256-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofEnvelope {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
    pub input: Vec<U256>,
}

impl ProofEnvelope {
    /// Exact encoded length for a proof with `inputs` public inputs.
    pub const fn encoded_len(inputs: usize) -> usize {
        (POINT_WORDS + inputs) * WORD_SIZE
    }

    /// Strictly decode `bytes`, expecting exactly `inputs` public inputs.
    pub fn decode(bytes: &[u8], inputs: usize) -> Result<Self, EnvelopeError> {
        let expected = Self::encoded_len(inputs);
        if bytes.len() != expected {
            return Err(EnvelopeError::InvalidLength {
                expected,
                actual: bytes.len(),
                inputs,
            });
        }

        let mut words = bytes.chunks_exact(WORD_SIZE).map(U256::from_be_slice);
        // The length check above guarantees every `next()` below yields.
        let mut next = || words.next().unwrap_or(U256::ZERO);

        let a = [next(), next()];
        let b = [[next(), next()], [next(), next()]];
        let c = [next(), next()];
        let input = (0..inputs).map(|_| next()).collect();

        Ok(Self { a, b, c, input })
    }

    /// ABI-encode the envelope back into proof bytes.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(Self::encoded_len(self.input.len()));
        let points = self
            .a
            .iter()
            .chain(self.b.iter().flatten())
            .chain(self.c.iter());
        for word in points.chain(self.input.iter()) {
            out.extend_from_slice(&word.to_be_bytes::<32>());
        }
        Bytes::from(out)
    }

    /// Public input at `index`, if the envelope has one.
    pub fn input(&self, index: usize) -> Option<U256> {
        self.input.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(inputs: usize) -> ProofEnvelope {
        let w = |n: u64| U256::from(n);
        ProofEnvelope {
            a: [w(1), w(2)],
            b: [[w(3), w(4)], [w(5), w(6)]],
            c: [w(7), w(8)],
            input: (0..inputs as u64).map(|i| w(100 + i)).collect(),
        }
    }

    #[test]
    fn encoded_length_is_static() {
        assert_eq!(ProofEnvelope::encoded_len(10), 18 * 32);
        assert_eq!(ProofEnvelope::encoded_len(14), 22 * 32);
        assert_eq!(sample(14).encode().len(), 704);
    }

    #[test]
    fn words_are_laid_out_in_tuple_order() {
        let bytes = sample(10).encode();
        // a[1] is the second word; b[1][0] the sixth; input[0] the ninth.
        assert_eq!(bytes[2 * 32 - 1], 2);
        assert_eq!(bytes[6 * 32 - 1], 5);
        assert_eq!(bytes[9 * 32 - 1], 100);
    }

    #[test]
    fn decode_recovers_encoded_envelope() {
        let envelope = sample(14);
        let decoded = ProofEnvelope::decode(&envelope.encode(), 14).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.input(13), Some(U256::from(113u64)));
        assert_eq!(decoded.input(14), None);
    }

    #[test]
    fn wrong_input_count_is_rejected() {
        let bytes = sample(10).encode();
        let err = ProofEnvelope::decode(&bytes, 14).unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::InvalidLength {
                expected: 704,
                actual: 576,
                inputs: 14
            }
        );
    }

    #[test]
    fn truncated_and_padded_bytes_are_rejected() {
        let bytes = sample(10).encode();
        assert!(ProofEnvelope::decode(&bytes[..bytes.len() - 1], 10).is_err());

        let mut padded = bytes.to_vec();
        padded.push(0);
        assert!(ProofEnvelope::decode(&padded, 10).is_err());
        assert!(ProofEnvelope::decode(&[], 10).is_err());
    }
}
