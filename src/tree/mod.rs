//! Main tree implementation.
//!
//! This module provides [`BinaryStateTree`], an in-memory binary trie keyed by
//! 31-byte stems with a 256-slot leaf group hanging off every stem. It supports:
//!
//! - Point insertion that splits stem nodes on their first differing bit
//! - Lookups and ordered iteration
//! - Full merkleization on every [`BinaryStateTree::merkelize`] call
//!
//! # Performance Characteristics
//!
//! | Operation   | Cost                                  |
//! |-------------|---------------------------------------|
//! | `insert`    | O(D), D <= 248                        |
//! | `get`       | O(D)                                  |
//! | `merkelize` | O(S * 256 + N), S = stems, N = nodes  |
//!
//! Nothing is cached between `merkelize` calls. Callers that hash after every
//! small batch of inserts pay the whole-tree cost each time.

mod insert;
mod iter;

use alloy_primitives::{Bytes, B256};

use crate::{Blake3Hasher, Hasher, Node, TreeKey};

pub use iter::{Iter, Stems};

/// The binary state tree.
///
/// A binary tree that stores opaque byte values at 32-byte keys.
/// Keys are split into a 31-byte stem (tree path) and 1-byte subindex (slot
/// within the stem's leaf group).
///
/// The tree is the sole owner of its nodes. Mutation needs `&mut self` and
/// hashing only `&self`, so readers never observe a half-applied insert.
#[derive(Clone, Debug)]
pub struct BinaryStateTree<H: Hasher = Blake3Hasher> {
    /// Root node of the tree
    root: Node,
    /// Hasher instance
    hasher: H,
}

impl<H: Hasher> Default for BinaryStateTree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Hasher> BinaryStateTree<H> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::with_hasher(H::default())
    }

    /// Same as [`BinaryStateTree::new`].
    pub fn create() -> Self {
        Self::new()
    }

    /// Create a new tree with a custom hasher.
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            root: Node::Empty,
            hasher,
        }
    }

    /// The hasher used by [`BinaryStateTree::merkelize`].
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Root node, for inspecting the tree shape.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Compute the root hash of the tree.
    ///
    /// An empty tree hashes to 32 zero bytes. The whole tree is rehashed on
    /// every call.
    #[must_use]
    pub fn merkelize(&self) -> B256 {
        self.root.hash(&self.hasher)
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Get a value by its full 32-byte key.
    #[must_use]
    pub fn get(&self, key: &TreeKey) -> Option<&Bytes> {
        let mut node = &self.root;
        let mut depth = 0;
        loop {
            match node {
                Node::Empty => return None,
                Node::Stem(stem_node) => {
                    return (stem_node.stem == key.stem)
                        .then(|| stem_node.get_value(key.subindex))
                        .flatten();
                }
                Node::Internal(internal) => {
                    node = internal.child(key.stem.bit_at(depth));
                    depth += 1;
                }
            }
        }
    }

    /// Get a value by B256 key.
    #[must_use]
    pub fn get_by_b256(&self, key: &B256) -> Option<&Bytes> {
        self.get(&TreeKey::from_bytes(*key))
    }

    /// Verify a value exists at a key.
    pub fn contains_key(&self, key: &TreeKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over all stem nodes in bit-path order.
    pub fn stems(&self) -> Stems<'_> {
        Stems::new(&self.root)
    }

    /// Iterate over all (key, value) pairs in key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.stems())
    }

    /// Returns the number of unique stems in the tree.
    pub fn stem_count(&self) -> usize {
        self.stems().count()
    }

    /// Get the number of set values in the tree.
    pub fn len(&self) -> usize {
        self.stems().map(|s| s.value_count()).sum()
    }

    /// Depth of the deepest stem node (0 when the root is a stem node or empty).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                Node::Empty => {}
                Node::Stem(_) => max_depth = max_depth.max(depth),
                Node::Internal(internal) => {
                    stack.push((internal.left.as_ref(), depth + 1));
                    stack.push((internal.right.as_ref(), depth + 1));
                }
            }
        }
        max_depth
    }
}

impl<'a, H: Hasher> IntoIterator for &'a BinaryStateTree<H> {
    type Item = (TreeKey, &'a Bytes);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
