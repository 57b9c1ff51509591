//! Tree node types.
//!
//! Three node shapes:
//! - `Node::Empty`: no data below this point (`hash = 0`)
//! - `InternalNode`: binary branch on one bit of the stem
//! - `StemNode`: a 31-byte stem plus its 256 value slots

use alloy_primitives::{Bytes, B256};

use crate::{Hasher, Stem, SubIndex, STEM_SUBTREE_WIDTH, SUBINDEX_BITS};

/// A node in the tree.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Node {
    /// Empty node (hash = 0)
    #[default]
    Empty,
    /// Internal branching node with two children
    Internal(InternalNode),
    /// Stem node holding a 256-slot leaf group
    Stem(StemNode),
}

impl Node {
    /// Calculate the hash of this node and everything below it.
    pub fn hash<H: Hasher>(&self, hasher: &H) -> B256 {
        match self {
            Self::Empty => B256::ZERO,
            Self::Internal(node) => node.hash(hasher),
            Self::Stem(node) => node.hash(hasher),
        }
    }

    /// Check if this node is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Internal branching node.
///
/// `left` holds the subtree whose stems have a 0 at this node's depth,
/// `right` the subtree with a 1.
///
/// Hash formula:
/// `hash = hash(left_hash || right_hash)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalNode {
    /// Left child (bit 0)
    pub left: Box<Node>,
    /// Right child (bit 1)
    pub right: Box<Node>,
}

impl InternalNode {
    /// Create a new internal node.
    pub fn new(left: Node, right: Node) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build an internal node with `child` on the side selected by `bit`
    /// and `other` on the opposite side.
    pub(crate) fn with_child(bit: bool, child: Node, other: Node) -> Self {
        if bit {
            Self::new(other, child)
        } else {
            Self::new(child, other)
        }
    }

    /// Borrow the child selected by `bit`.
    pub fn child(&self, bit: bool) -> &Node {
        if bit {
            &self.right
        } else {
            &self.left
        }
    }

    /// Calculate the hash: `hash(left_hash || right_hash)`
    #[cfg(not(feature = "parallel"))]
    pub fn hash<H: Hasher>(&self, hasher: &H) -> B256 {
        let left_hash = self.left.hash(hasher);
        let right_hash = self.right.hash(hasher);
        hasher.hash_64(&left_hash, &right_hash)
    }

    /// Calculate the hash: `hash(left_hash || right_hash)`, hashing both
    /// subtrees on the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn hash<H: Hasher>(&self, hasher: &H) -> B256 {
        let (left_hash, right_hash) =
            rayon::join(|| self.left.hash(hasher), || self.right.hash(hasher));
        hasher.hash_64(&left_hash, &right_hash)
    }
}

/// Stem node holding the 256 value slots of one stem.
///
/// Hashing:
/// 1. Hash each value: `data[i] = hash(value[i])` or zero if unset
/// 2. Build an 8-level binary tree from the bottom up, pairing neighbours
/// 3. Final hash = `hash(stem || 0x00 || subtree_root)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StemNode {
    /// The 31-byte stem
    pub stem: Stem,
    /// Value slots indexed by subindex
    values: Box<[Option<Bytes>; STEM_SUBTREE_WIDTH]>,
}

impl StemNode {
    /// Create a new stem node with no values.
    pub fn new(stem: Stem) -> Self {
        Self {
            stem,
            values: Box::new(std::array::from_fn(|_| None)),
        }
    }

    /// Set the value at the given subindex, replacing any previous value.
    pub fn set_value(&mut self, subindex: SubIndex, value: Bytes) {
        self.values[subindex as usize] = Some(value);
    }

    /// Get the value at the given subindex.
    pub fn get_value(&self, subindex: SubIndex) -> Option<&Bytes> {
        self.values[subindex as usize].as_ref()
    }

    /// Iterate over the set slots in subindex order.
    pub fn values(&self) -> impl Iterator<Item = (SubIndex, &Bytes)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| value.as_ref().map(|v| (idx as SubIndex, v)))
    }

    /// Number of set slots.
    pub fn value_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Per-slot leaf hashes: `hash(value)` or zero for unset slots.
    fn leaf_hashes<H: Hasher>(&self, hasher: &H) -> [B256; STEM_SUBTREE_WIDTH] {
        let mut data = [B256::ZERO; STEM_SUBTREE_WIDTH];
        for (idx, value) in self.values.iter().enumerate() {
            if let Some(value) = value {
                data[idx] = hasher.hash(value);
            }
        }
        data
    }

    /// Root of the 256-leaf value tree.
    pub fn subtree_root<H: Hasher>(&self, hasher: &H) -> B256 {
        let mut data = self.leaf_hashes(hasher);
        // Level 1: 256 -> 128, ..., level 8: 2 -> 1
        for level in 1..=SUBINDEX_BITS {
            fold_level(&mut data, STEM_SUBTREE_WIDTH >> level, hasher);
        }
        data[0]
    }

    /// Sibling hashes on the path from `subindex` to the value tree root,
    /// leaf level first.
    pub fn subtree_siblings<H: Hasher>(
        &self,
        subindex: SubIndex,
        hasher: &H,
    ) -> [B256; SUBINDEX_BITS] {
        let mut data = self.leaf_hashes(hasher);
        let mut siblings = [B256::ZERO; SUBINDEX_BITS];
        let mut idx = subindex as usize;

        for (level, sibling) in siblings.iter_mut().enumerate() {
            *sibling = data[idx ^ 1];
            fold_level(&mut data, STEM_SUBTREE_WIDTH >> (level + 1), hasher);
            idx >>= 1;
        }

        siblings
    }

    /// Calculate the hash: `hash(stem || 0x00 || subtree_root)`
    pub fn hash<H: Hasher>(&self, hasher: &H) -> B256 {
        let subtree_root = self.subtree_root(hasher);
        hasher.hash_stem_node(self.stem.as_bytes(), &subtree_root)
    }
}

/// Collapse the first `2 * pairs` entries of `data` into the first `pairs`
/// entries by hashing adjacent pairs.
fn fold_level<H: Hasher>(data: &mut [B256], pairs: usize, hasher: &H) {
    for i in 0..pairs {
        data[i] = hasher.hash_64(&data[i * 2], &data[i * 2 + 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Blake3Hasher, Sha256Hasher};

    /// Subtree root computed the long way: one `Vec` per level.
    fn naive_subtree_root<H: Hasher>(node: &StemNode, hasher: &H) -> B256 {
        let mut level: Vec<B256> = (0..=255u8)
            .map(|i| {
                node.get_value(i)
                    .map(|v| hasher.hash(v))
                    .unwrap_or(B256::ZERO)
            })
            .collect();
        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| hasher.hash_64(&pair[0], &pair[1]))
                .collect();
        }
        level[0]
    }

    #[test]
    fn test_empty_node_hash() {
        let hasher = Blake3Hasher;
        let node: Node = Node::Empty;
        assert_eq!(node.hash(&hasher), B256::ZERO);
        assert!(node.is_empty());
    }

    #[test]
    fn test_stem_node_with_value() {
        let hasher = Blake3Hasher;
        let stem = Stem::new([0u8; 31]);
        let mut node = StemNode::new(stem);

        node.set_value(0, Bytes::from_static(&[0x42]));
        assert_eq!(node.get_value(0), Some(&Bytes::from_static(&[0x42])));
        assert_eq!(node.get_value(1), None);
        assert_eq!(node.value_count(), 1);

        let hash = node.hash(&hasher);
        assert_ne!(hash, B256::ZERO);
    }

    #[test]
    fn test_set_value_overwrites() {
        let mut node = StemNode::new(Stem::new([7u8; 31]));
        node.set_value(9, Bytes::from_static(b"first"));
        node.set_value(9, Bytes::from_static(b"second"));

        assert_eq!(node.get_value(9), Some(&Bytes::from_static(b"second")));
        assert_eq!(node.value_count(), 1);
    }

    #[test]
    fn test_values_in_subindex_order() {
        let mut node = StemNode::new(Stem::new([1u8; 31]));
        node.set_value(200, Bytes::from_static(b"c"));
        node.set_value(3, Bytes::from_static(b"a"));
        node.set_value(17, Bytes::from_static(b"b"));

        let indices: Vec<_> = node.values().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![3, 17, 200]);
    }

    #[test]
    fn test_subtree_root_matches_naive() {
        let hasher = Sha256Hasher;
        let mut node = StemNode::new(Stem::new([0x5au8; 31]));
        for i in [0u8, 1, 2, 77, 128, 254, 255] {
            node.set_value(i, Bytes::from(vec![i, i.wrapping_add(1), 0xee]));
        }

        assert_eq!(node.subtree_root(&hasher), naive_subtree_root(&node, &hasher));
    }

    #[test]
    fn test_subtree_siblings_rebuild_root() {
        let hasher = Blake3Hasher;
        let mut node = StemNode::new(Stem::new([0x33u8; 31]));
        node.set_value(5, Bytes::from_static(b"five"));
        node.set_value(6, Bytes::from_static(b"six"));
        node.set_value(250, Bytes::from_static(b"two-fifty"));

        for subindex in [5u8, 6, 250, 0, 255] {
            let siblings = node.subtree_siblings(subindex, &hasher);
            let mut current = node
                .get_value(subindex)
                .map(|v| hasher.hash(v))
                .unwrap_or(B256::ZERO);
            for (level, sibling) in siblings.iter().enumerate() {
                current = if (subindex >> level) & 1 == 0 {
                    hasher.hash_64(&current, sibling)
                } else {
                    hasher.hash_64(sibling, &current)
                };
            }
            assert_eq!(current, node.subtree_root(&hasher), "subindex {subindex}");
        }
    }

    #[test]
    fn test_stem_node_empty_hash() {
        let hasher = Sha256Hasher;

        // All-zero stem and no values: every input is zero, so is the hash.
        let node = StemNode::new(Stem::new([0u8; 31]));
        assert_eq!(node.hash(&hasher), B256::ZERO);

        // A non-zero stem contributes even with no values.
        let node = StemNode::new(Stem::new([1u8; 31]));
        assert_ne!(node.hash(&hasher), B256::ZERO);
    }

    #[test]
    fn test_all_zero_value_matches_unset_slot() {
        let hasher = Blake3Hasher;
        let stem = Stem::new([9u8; 31]);

        let mut with_zero = StemNode::new(stem);
        with_zero.set_value(4, Bytes::from(vec![0u8; 32]));
        let unset = StemNode::new(stem);

        assert_eq!(with_zero.hash(&hasher), unset.hash(&hasher));
    }

    #[test]
    fn test_internal_node_hash() {
        let hasher = Blake3Hasher;
        let mut stem_node = StemNode::new(Stem::new([0xffu8; 31]));
        stem_node.set_value(0, Bytes::from_static(b"v"));
        let stem_hash = stem_node.hash(&hasher);

        let internal = InternalNode::with_child(true, Node::Stem(stem_node), Node::Empty);
        assert!(internal.left.is_empty());
        assert!(!internal.child(true).is_empty());
        assert_eq!(
            internal.hash(&hasher),
            hasher.hash_64(&B256::ZERO, &stem_hash)
        );
    }
}
