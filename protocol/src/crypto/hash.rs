//! # Hashing Utilities
//!
//! Everything the verifier hashes, it hashes with Keccak-256. Not because
//! Keccak is the fastest hash around (it isn't), but because the proving
//! circuits and the on-chain verifier contracts both use it, and a value
//! computed with any other hash would simply never match a proof.
//!
//! ## hash_to_field
//!
//! [`hash_to_field`] maps a byte string to an element of the BN254 scalar
//! field: hash with Keccak-256, read the digest as a big-endian integer,
//! reduce modulo `r`. This is the exact construction the circuits use for
//! request identifiers, accounts tree values and signed messages, so it
//! must stay byte-for-byte identical to the on-chain
//! `uint256(keccak256(data)) % SNARK_FIELD`.

use alloy_primitives::{keccak256 as alloy_keccak256, Keccak256, U256};
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

/// Order of the BN254 scalar field, a.k.a. `SNARK_FIELD` in the Solidity
/// verifiers. Every public input of a proof is strictly below this value.
pub const SNARK_FIELD: U256 = U256::from_limbs(<Fr as PrimeField>::MODULUS.0);

/// Keccak-256 of the input, as a raw 32-byte digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    alloy_keccak256(data).0
}

/// Keccak-256 over several slices fed back to back.
///
/// Same digest as hashing their concatenation, without allocating the
/// concatenation. Handy for `abi.encodePacked`-style preimages.
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().0
}

/// Reduce a big-endian 32-byte word modulo the scalar field order.
pub fn reduce_to_field(word: &[u8; 32]) -> U256 {
    let element = Fr::from_be_bytes_mod_order(word);
    U256::from_be_slice(&element.into_bigint().to_bytes_be())
}

/// Hash arbitrary bytes to a BN254 scalar field element.
///
/// ```
/// use sismo_connect_protocol::crypto::hash::{hash_to_field, SNARK_FIELD};
///
/// let element = hash_to_field(b"main");
/// assert!(element < SNARK_FIELD);
/// ```
pub fn hash_to_field(data: &[u8]) -> U256 {
    reduce_to_field(&keccak256(data))
}

/// [`hash_to_field`] over the concatenation of `parts`.
pub fn hash_to_field_multi(parts: &[&[u8]]) -> U256 {
    reduce_to_field(&keccak256_multi(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_known_vector() {
        // Keccak-256 of the empty string. Note: this is NOT the SHA3-256
        // vector; the padding differs and so does every output bit.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn snark_field_matches_published_constant() {
        assert_eq!(
            format!("{SNARK_FIELD:#x}"),
            "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
        );
    }

    #[test]
    fn hash_to_field_reduces_large_digests() {
        // keccak256("") is above r, so the reduction must kick in.
        let raw = U256::from_be_bytes(keccak256(b""));
        assert!(raw >= SNARK_FIELD);

        let reduced = hash_to_field(b"");
        assert_eq!(reduced, raw - SNARK_FIELD);
        assert_eq!(
            format!("{reduced:#x}"),
            "0x4410c360230a295b13d66d8d6c1a24c44311531e39c64f66c7301b49d85a46c"
        );
    }

    #[test]
    fn multi_part_hash_equals_concatenation() {
        let joined = keccak256(b"hello world");
        let parts = keccak256_multi(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, parts);
        assert_eq!(
            hash_to_field(b"hello world"),
            hash_to_field_multi(&[b"hello ", b"world"])
        );
    }
}
