//! Point insertion and leaf splitting.
//!
//! Each step takes a subtree by value and hands back its replacement; the
//! caller writes the result into the slot it came from. Validation happens
//! before the root is taken, so the walk itself cannot fail.

use alloy_primitives::{Bytes, B256};
use log::trace;

use crate::{error::Result, BstError, Hasher, InternalNode, Node, StemNode, TreeKey, MAX_DEPTH};

use super::BinaryStateTree;

impl<H: Hasher> BinaryStateTree<H> {
    /// Insert a value at the given key. The value bytes are copied into the tree.
    ///
    /// Inserting at an occupied key replaces the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::EmptyValue`] if `value` has no bytes. The tree is
    /// left unchanged.
    pub fn insert(&mut self, key: TreeKey, value: impl AsRef<[u8]>) -> Result<()> {
        let value = checked_value(value.as_ref())?;
        self.insert_checked(key, value);
        Ok(())
    }

    /// Insert a value using a B256 key.
    pub fn insert_b256(&mut self, key: B256, value: impl AsRef<[u8]>) -> Result<()> {
        self.insert(TreeKey::from_bytes(key), value)
    }

    /// Insert a value using a raw key slice.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::InvalidKeyLength`] unless `key` is exactly 32 bytes,
    /// and [`BstError::EmptyValue`] for an empty value.
    pub fn insert_slice(&mut self, key: &[u8], value: impl AsRef<[u8]>) -> Result<()> {
        let key = TreeKey::try_from_slice(key)?;
        self.insert(key, value)
    }

    /// Batch insert multiple key-value pairs.
    ///
    /// All entries are validated before the first one is applied, so an error
    /// leaves the tree exactly as it was. Later entries win over earlier ones
    /// for the same key.
    pub fn insert_batch<V: AsRef<[u8]>>(
        &mut self,
        entries: impl IntoIterator<Item = (TreeKey, V)>,
    ) -> Result<()> {
        let entries = entries
            .into_iter()
            .map(|(key, value)| Ok((key, checked_value(value.as_ref())?)))
            .collect::<Result<Vec<_>>>()?;

        for (key, value) in entries {
            self.insert_checked(key, value);
        }
        Ok(())
    }

    fn insert_checked(&mut self, key: TreeKey, value: Bytes) {
        if self.root.is_empty() {
            trace!("Inserting {:?} into empty tree", key);
        }
        let root = std::mem::take(&mut self.root);
        self.root = insert_node(root, key, value, 0);
    }
}

fn checked_value(value: &[u8]) -> Result<Bytes> {
    if value.is_empty() {
        return Err(BstError::EmptyValue);
    }
    Ok(Bytes::copy_from_slice(value))
}

fn new_stem_node(key: &TreeKey, value: Bytes) -> StemNode {
    let mut stem_node = StemNode::new(key.stem);
    stem_node.set_value(key.subindex, value);
    stem_node
}

/// Insert into the subtree rooted at `node`, which sits `depth` bits below the root.
fn insert_node(node: Node, key: TreeKey, value: Bytes, depth: usize) -> Node {
    match node {
        Node::Empty => {
            trace!("Insert traversed Empty (depth: {})", depth);
            Node::Stem(new_stem_node(&key, value))
        }
        Node::Stem(mut stem_node) if stem_node.stem == key.stem => {
            trace!(
                "Insert traversed matching Stem (depth: {}, subindex: {})",
                depth,
                key.subindex
            );
            stem_node.set_value(key.subindex, value);
            Node::Stem(stem_node)
        }
        Node::Stem(stem_node) => {
            trace!(
                "Insert traversed foreign {:?} (depth: {}), stems diverge at bit {:?}",
                stem_node.stem,
                depth,
                stem_node.stem.first_differing_bit(&key.stem)
            );
            Node::Internal(split_leaf(stem_node, key, value, depth))
        }
        Node::Internal(mut internal) => {
            let bit = key.stem.bit_at(depth);
            trace!("Insert traversed Internal (depth: {}, bit: {})", depth, bit as u8);
            let child = if bit {
                &mut internal.right
            } else {
                &mut internal.left
            };
            let subtree = std::mem::take(child.as_mut());
            **child = insert_node(subtree, key, value, depth + 1);
            Node::Internal(internal)
        }
    }
}

/// Push `leaf` and a new stem node for `key` apart.
///
/// While both stems agree at `depth` this emits a single-child internal node
/// and descends; at the first differing bit the two stem nodes become siblings.
fn split_leaf(leaf: StemNode, key: TreeKey, value: Bytes, depth: usize) -> InternalNode {
    debug_assert!(depth < MAX_DEPTH, "distinct stems must differ within {MAX_DEPTH} bits");

    let new_bit = key.stem.bit_at(depth);
    if new_bit == leaf.stem.bit_at(depth) {
        let child = split_leaf(leaf, key, value, depth + 1);
        InternalNode::with_child(new_bit, Node::Internal(child), Node::Empty)
    } else {
        trace!("Split placed both stems at depth {}", depth + 1);
        InternalNode::with_child(
            new_bit,
            Node::Stem(new_stem_node(&key, value)),
            Node::Stem(leaf),
        )
    }
}
