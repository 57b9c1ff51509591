//! # Binary State Tree (BST)
//!
//! An in-memory binary trie for committing to a key-value state with a single
//! 32-byte root hash.
//!
//! ## Tree Structure
//!
//! The tree uses 32-byte keys where:
//! - First 31 bytes: **stem** (the 248-bit path through the tree, MSB first)
//! - Last byte: **subindex** (slot within the stem's 256-value leaf group)
//!
//! Node types:
//! - `Node::Empty`: Represents an empty node/subtree (hash = 0)
//! - `InternalNode`: Has a left (bit 0) and right (bit 1) child
//! - `StemNode`: Has a stem (31 bytes) and 256 optional value slots
//!
//! Inserting a key whose stem differs from an existing stem node splits that
//! node into internal nodes down to the first bit where the two stems differ.
//!
//! ## Hashing
//!
//! - empty: `[0x00] * 32`
//! - internal: `hash(left || right)`
//! - stem: `hash(stem || 0x00 || root of the 256 value hashes)`
//!
//! Any input made only of zero bytes hashes to `[0x00] * 32`. BLAKE3 is the
//! default hash; see [`Hasher`] to plug in another one.
//!
//! ```
//! use bst::{BinaryStateTree, TreeKey, B256};
//!
//! let mut tree: BinaryStateTree = BinaryStateTree::create();
//! assert_eq!(tree.merkelize(), B256::ZERO);
//!
//! let key = TreeKey::from_bytes(B256::repeat_byte(0x01));
//! tree.insert(key, b"value").unwrap();
//! assert_ne!(tree.merkelize(), B256::ZERO);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
mod hash;
mod key;
mod node;
mod proof;
mod tree;

pub use error::{BstError, Result};
pub use hash::{Blake3Hasher, Hasher, Sha256Hasher};
pub use key::{
    Stem, SubIndex, TreeKey, KEY_LEN, MAX_DEPTH, STEM_LEN, STEM_SUBTREE_WIDTH, SUBINDEX_BITS,
};
pub use node::{InternalNode, Node, StemNode};
pub use proof::{Direction, Proof, ProofNode};
pub use tree::{BinaryStateTree, Iter, Stems};

/// Re-export alloy primitives for convenience
pub use alloy_primitives::{Bytes, B256};
