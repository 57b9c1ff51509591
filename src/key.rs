//! Tree key types and utilities.
//!
//! Tree keys are 32 bytes where:
//! - First 31 bytes: stem (the path of the leaf group through the binary tree)
//! - Last byte: subindex (slot inside the 256-wide leaf group, 0-255)

use alloy_primitives::B256;
use std::fmt;

use crate::{error::Result, BstError};

/// Length of a stem in bytes (31 bytes = 248 bits)
pub const STEM_LEN: usize = 31;

/// Length of a full tree key in bytes.
pub const KEY_LEN: usize = STEM_LEN + 1;

/// Number of value slots hanging off one stem.
pub const STEM_SUBTREE_WIDTH: usize = 256;

/// Number of bits in the subindex (8 bits = 256 possible values)
pub const SUBINDEX_BITS: usize = 8;

/// Maximum depth of the binary part of the tree (one level per stem bit).
pub const MAX_DEPTH: usize = STEM_LEN * 8;

/// A 31-byte stem that identifies a group of 256 values.
///
/// The derived ordering is lexicographic on the bytes, which is the same as
/// ordering by bit path (MSB first).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stem(pub [u8; STEM_LEN]);

impl Stem {
    /// Create a new stem from bytes.
    pub const fn new(bytes: [u8; STEM_LEN]) -> Self {
        Self(bytes)
    }

    /// Create a stem from a slice.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; STEM_LEN] = slice
            .try_into()
            .map_err(|_| BstError::InvalidStemLength(slice.len()))?;
        Ok(Self(bytes))
    }

    /// Get the underlying bytes.
    pub const fn as_bytes(&self) -> &[u8; STEM_LEN] {
        &self.0
    }

    /// Get bit at position (0 = MSB of first byte, 247 = LSB of last byte).
    /// `true` selects the right child.
    pub fn bit_at(&self, pos: usize) -> bool {
        debug_assert!(pos < MAX_DEPTH);
        let byte_idx = pos / 8;
        let bit_idx = 7 - (pos % 8);
        (self.0[byte_idx] >> bit_idx) & 1 == 1
    }

    /// Find the first bit position where two stems differ.
    /// Returns None if stems are equal.
    pub fn first_differing_bit(&self, other: &Self) -> Option<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .position(|(a, b)| a != b)
            .map(|i| i * 8 + (self.0[i] ^ other.0[i]).leading_zeros() as usize)
    }
}

impl fmt::Debug for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stem(0x{})", hex::encode(self.0))
    }
}

impl From<[u8; STEM_LEN]> for Stem {
    fn from(bytes: [u8; STEM_LEN]) -> Self {
        Self(bytes)
    }
}

/// Subindex within a stem's leaf group (0-255).
pub type SubIndex = u8;

/// A complete 32-byte tree key (stem + subindex).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeKey {
    /// The 31-byte stem identifying the leaf group.
    pub stem: Stem,
    /// The slot within the leaf group (0-255).
    pub subindex: SubIndex,
}

impl TreeKey {
    /// Create a new tree key from stem and subindex.
    pub const fn new(stem: Stem, subindex: SubIndex) -> Self {
        Self { stem, subindex }
    }

    /// Create a tree key from a 32-byte array.
    pub fn from_bytes(bytes: B256) -> Self {
        let mut stem_bytes = [0u8; STEM_LEN];
        stem_bytes.copy_from_slice(&bytes[..STEM_LEN]);
        Self {
            stem: Stem(stem_bytes),
            subindex: bytes[STEM_LEN],
        }
    }

    /// Create a tree key from an arbitrary slice.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::InvalidKeyLength`] unless the slice is exactly 32 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != KEY_LEN {
            return Err(BstError::InvalidKeyLength(slice.len()));
        }
        Ok(Self::from_bytes(B256::from_slice(slice)))
    }

    /// Convert to a 32-byte array.
    pub fn to_bytes(&self) -> B256 {
        let mut bytes = [0u8; KEY_LEN];
        bytes[..STEM_LEN].copy_from_slice(&self.stem.0);
        bytes[STEM_LEN] = self.subindex;
        B256::from(bytes)
    }
}

impl fmt::Debug for TreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeKey {{ stem: 0x{}, subindex: {} }}",
            hex::encode(self.stem.0),
            self.subindex
        )
    }
}

impl From<B256> for TreeKey {
    fn from(bytes: B256) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<TreeKey> for B256 {
    fn from(key: TreeKey) -> Self {
        key.to_bytes()
    }
}

impl TryFrom<&[u8]> for TreeKey {
    type Error = BstError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        Self::try_from_slice(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_bit_at() {
        let mut bytes = [0u8; STEM_LEN];
        bytes[0] = 0b10000000;
        bytes[30] = 0b00000001;
        let stem = Stem(bytes);

        assert!(stem.bit_at(0));
        assert!(!stem.bit_at(1));
        assert!(!stem.bit_at(7));
        assert!(!stem.bit_at(246));
        assert!(stem.bit_at(247));
    }

    #[test]
    fn test_first_differing_bit() {
        let stem1 = Stem([0u8; STEM_LEN]);
        let mut bytes2 = [0u8; STEM_LEN];
        bytes2[0] = 0b10000000;
        let stem2 = Stem(bytes2);

        assert_eq!(stem1.first_differing_bit(&stem2), Some(0));
        assert_eq!(stem1.first_differing_bit(&stem1), None);

        let mut bytes3 = [0u8; STEM_LEN];
        bytes3[0] = 0b00000001;
        let stem3 = Stem(bytes3);
        assert_eq!(stem1.first_differing_bit(&stem3), Some(7));

        let mut bytes4 = [0u8; STEM_LEN];
        bytes4[30] = 0b00000001;
        let stem4 = Stem(bytes4);
        assert_eq!(stem1.first_differing_bit(&stem4), Some(247));
    }

    #[test]
    fn test_stem_order_matches_bit_path() {
        let mut low = [0u8; STEM_LEN];
        low[0] = 0b01111111;
        let mut high = [0u8; STEM_LEN];
        high[0] = 0b10000000;
        assert!(Stem(low) < Stem(high));
        assert!(!Stem(low).bit_at(0));
        assert!(Stem(high).bit_at(0));
    }

    #[test]
    fn test_tree_key_roundtrip() {
        let original = B256::repeat_byte(0x42);
        let key = TreeKey::from_bytes(original);
        assert_eq!(key.subindex, 0x42);
        assert_eq!(key.to_bytes(), original);
    }

    #[test]
    fn test_try_from_slice_rejects_wrong_length() {
        assert!(matches!(
            TreeKey::try_from_slice(&[0u8; 31]),
            Err(BstError::InvalidKeyLength(31))
        ));
        assert!(matches!(
            TreeKey::try_from_slice(&[0u8; 33]),
            Err(BstError::InvalidKeyLength(33))
        ));
        assert!(matches!(
            TreeKey::try_from_slice(&[]),
            Err(BstError::InvalidKeyLength(0))
        ));

        let mut bytes = [0x11u8; KEY_LEN];
        bytes[31] = 0x07;
        let key = TreeKey::try_from(&bytes[..]).unwrap();
        assert_eq!(key.stem, Stem([0x11; STEM_LEN]));
        assert_eq!(key.subindex, 0x07);
    }

    #[test]
    fn test_stem_try_from_slice() {
        assert!(Stem::try_from_slice(&[1u8; STEM_LEN]).is_ok());
        assert!(matches!(
            Stem::try_from_slice(&[1u8; 32]),
            Err(BstError::InvalidStemLength(32))
        ));
    }
}
