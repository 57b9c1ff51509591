//! Hash function abstraction for the tree.
//!
//! BLAKE3 is the reference hash. The [`Hasher`] trait lets callers swap in any
//! other 32-byte digest (SHA-256 ships with the crate, tests use cheap mocks).

use alloy_primitives::B256;
use sha2::{Digest, Sha256};

use crate::STEM_LEN;

/// Trait for hash functions used by the tree.
///
/// Implementors only provide [`Hasher::digest`]. Every hash the tree computes
/// goes through [`Hasher::hash`], which applies the zero convention:
/// - an input made only of zero bytes (including the empty input) hashes to `[0x00] * 32`
/// - all other inputs are passed to `digest`
///
/// The same 32-zero-byte value doubles as the hash of an empty subtree, so an
/// all-zero input can't be told apart from "nothing here".
///
/// # Thread Safety
///
/// Hashers are `Send + Sync` so that merkleization can fan out over rayon
/// with the `"parallel"` feature.
pub trait Hasher: Clone + Default + Send + Sync {
    /// Raw digest of arbitrary input.
    fn digest(&self, input: &[u8]) -> B256;

    /// Hash with the zero convention applied.
    fn hash(&self, input: &[u8]) -> B256 {
        if input.iter().all(|&b| b == 0) {
            return B256::ZERO;
        }
        self.digest(input)
    }

    /// Hash two child digests: `hash(left || right)`
    fn hash_64(&self, left: &B256, right: &B256) -> B256 {
        let mut input = [0u8; 64];
        input[..32].copy_from_slice(left.as_slice());
        input[32..].copy_from_slice(right.as_slice());
        self.hash(&input)
    }

    /// Hash for stem node: `hash(stem || 0x00 || subtree_root)`
    fn hash_stem_node(&self, stem: &[u8; STEM_LEN], subtree_root: &B256) -> B256 {
        let mut input = [0u8; 64];
        input[..STEM_LEN].copy_from_slice(stem);
        input[STEM_LEN] = 0x00;
        input[32..].copy_from_slice(subtree_root.as_slice());
        self.hash(&input)
    }
}

/// BLAKE3-based hasher (reference).
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn digest(&self, input: &[u8]) -> B256 {
        B256::from(*blake3::hash(input).as_bytes())
    }
}

/// SHA256-based hasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn digest(&self, input: &[u8]) -> B256 {
        B256::from_slice(&Sha256::digest(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_zero_hash_special_case_blake3() {
        let hasher = Blake3Hasher;

        assert_eq!(hasher.hash(&[]), B256::ZERO);
        assert_eq!(hasher.hash(&[0u8; 7]), B256::ZERO);
        assert_eq!(hasher.hash_64(&B256::ZERO, &B256::ZERO), B256::ZERO);
        assert_eq!(hasher.hash_stem_node(&[0u8; STEM_LEN], &B256::ZERO), B256::ZERO);
    }

    #[test]
    fn test_zero_hash_special_case_sha256() {
        let hasher = Sha256Hasher;

        assert_eq!(hasher.hash(&[]), B256::ZERO);
        assert_eq!(hasher.hash_64(&B256::ZERO, &B256::ZERO), B256::ZERO);
    }

    #[test]
    fn test_digest_ignores_zero_convention() {
        assert_eq!(
            Blake3Hasher.digest(&[]),
            b256!("af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262")
        );
        assert_eq!(
            Sha256Hasher.digest(&[]),
            b256!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn test_known_blake3_digest() {
        assert_eq!(
            Blake3Hasher.hash(b"abc"),
            b256!("6437b3ac38465133ffb63b75273a8db548c558465d79db03fd359c6cd5bd9d85")
        );
    }

    #[test]
    fn test_hash_64_is_concatenation() {
        let hasher = Blake3Hasher;
        let left = B256::repeat_byte(0x42);
        let right = B256::ZERO;

        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(left.as_slice());
        concat.extend_from_slice(right.as_slice());

        let hash = hasher.hash_64(&left, &right);
        assert_ne!(hash, B256::ZERO);
        assert_eq!(hash, hasher.hash(&concat));
        assert_ne!(hash, hasher.hash_64(&right, &left));
    }

    #[test]
    fn test_stem_node_layout() {
        let hasher = Sha256Hasher;
        let stem = [0xabu8; STEM_LEN];
        let root = B256::repeat_byte(0xcd);

        let mut expected_input = Vec::with_capacity(64);
        expected_input.extend_from_slice(&stem);
        expected_input.push(0x00);
        expected_input.extend_from_slice(root.as_slice());

        assert_eq!(
            hasher.hash_stem_node(&stem, &root),
            hasher.hash(&expected_input)
        );
    }
}
