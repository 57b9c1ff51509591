//! Merkle proof generation and verification.
//!
//! Proofs allow verifying that a key holds a value, or holds nothing, against
//! a root hash without having the full tree.

use alloy_primitives::{Bytes, B256};
use log::debug;

use crate::{
    error::Result, BinaryStateTree, BstError, Hasher, Node, Stem, TreeKey, MAX_DEPTH,
    STEM_LEN, SUBINDEX_BITS,
};

/// Direction in the tree (for proof paths)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Stem bit 0
    Left,
    /// Stem bit 1
    Right,
}

impl Direction {
    /// Direction taken for a stem bit (`false` = left).
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// Stem bit that selects this direction.
    pub const fn bit(self) -> bool {
        matches!(self, Self::Right)
    }
}

/// A node in a Merkle proof path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProofNode {
    /// Sibling hash at an internal node level
    Internal {
        sibling: B256,
        /// Side the proven path takes at this level
        direction: Direction,
    },
    /// The key's own stem node
    Stem {
        stem: Stem,
        /// Sibling hashes for the 8-level value tree (from leaf to root)
        subtree_siblings: [B256; SUBINDEX_BITS],
    },
    /// A different stem occupies the key's position (absence proof)
    Extension {
        stem: Stem,
        /// Root of that stem's value tree
        subtree_root: B256,
    },
}

/// A Merkle proof for a key in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proof {
    /// The key being proven
    pub key: TreeKey,
    /// The value at the key (None if proving non-existence)
    pub value: Option<Bytes>,
    /// Proof nodes from leaf to root
    pub path: Vec<ProofNode>,
}

impl Proof {
    /// Create a new proof.
    pub fn new(key: TreeKey, value: Option<Bytes>, path: Vec<ProofNode>) -> Self {
        Self { key, value, path }
    }

    /// Verify this proof against an expected root hash.
    ///
    /// A value made only of zero bytes hashes like an unset slot, so the
    /// absence proof for an unset slot also verifies with such a value
    /// attached. `Ok(true)` for an all-zero `value` does not show that the
    /// value was ever stored.
    pub fn verify<H: Hasher>(&self, hasher: &H, expected_root: &B256) -> Result<bool> {
        let computed_root = self.compute_root(hasher)?;
        Ok(&computed_root == expected_root)
    }

    /// Compute the root hash from this proof.
    ///
    /// # Errors
    ///
    /// Returns [`BstError::InvalidProof`] if the path is not shaped like a
    /// path to `self.key`.
    pub fn compute_root<H: Hasher>(&self, hasher: &H) -> Result<B256> {
        let (terminal, internals) = match self.path.split_first() {
            Some((node @ (ProofNode::Stem { .. } | ProofNode::Extension { .. }), rest)) => {
                (Some(node), rest)
            }
            _ => (None, self.path.as_slice()),
        };

        let depth = internals.len();
        if depth > MAX_DEPTH {
            return Err(invalid(format!("path depth {depth} exceeds {MAX_DEPTH}")));
        }

        let mut current_hash = match terminal {
            Some(ProofNode::Stem {
                stem,
                subtree_siblings,
            }) => {
                if *stem != self.key.stem {
                    return Err(invalid("stem proof for a different stem"));
                }
                let mut hash = match &self.value {
                    Some(v) => hasher.hash(v),
                    None => B256::ZERO,
                };
                for (level, sibling) in subtree_siblings.iter().enumerate() {
                    hash = if (self.key.subindex >> level) & 1 == 0 {
                        hasher.hash_64(&hash, sibling)
                    } else {
                        hasher.hash_64(sibling, &hash)
                    };
                }
                hasher.hash_stem_node(stem.as_bytes(), &hash)
            }
            Some(ProofNode::Extension { stem, subtree_root }) => {
                if self.value.is_some() {
                    return Err(invalid("extension proof carrying a value"));
                }
                match stem.first_differing_bit(&self.key.stem) {
                    None => return Err(invalid("extension proof with matching stem")),
                    Some(bit) if bit < depth => {
                        return Err(invalid("extension stem leaves the proven path"));
                    }
                    Some(_) => {}
                }
                hasher.hash_stem_node(stem.as_bytes(), subtree_root)
            }
            _ => {
                if self.value.is_some() {
                    return Err(invalid("value without a stem proof"));
                }
                B256::ZERO
            }
        };

        for (i, node) in internals.iter().enumerate() {
            let node_depth = depth - 1 - i;
            let ProofNode::Internal { sibling, direction } = node else {
                return Err(invalid(format!("non-internal node at depth {node_depth}")));
            };
            if direction.bit() != self.key.stem.bit_at(node_depth) {
                return Err(invalid(format!(
                    "direction at depth {node_depth} disagrees with the key"
                )));
            }
            current_hash = match direction {
                Direction::Left => hasher.hash_64(&current_hash, sibling),
                Direction::Right => hasher.hash_64(sibling, &current_hash),
            };
        }

        Ok(current_hash)
    }

    /// Get the size of the proof in bytes.
    pub fn size(&self) -> usize {
        let mut size = 32; // key
        size += 1 + self.value.as_ref().map_or(0, |v| v.len());

        for node in &self.path {
            size += match node {
                ProofNode::Internal { .. } => 32 + 1, // sibling + direction
                ProofNode::Stem {
                    subtree_siblings, ..
                } => STEM_LEN + subtree_siblings.len() * 32,
                ProofNode::Extension { .. } => STEM_LEN + 32,
            };
        }
        size
    }
}

fn invalid(reason: impl Into<String>) -> BstError {
    BstError::InvalidProof(reason.into())
}

impl<H: Hasher> BinaryStateTree<H> {
    /// Generate a proof for `key`.
    ///
    /// Works for present and absent keys alike. Absent keys produce a proof
    /// ending in an empty subtree, a foreign stem (`Extension`), or the key's
    /// own stem with an unset slot.
    pub fn prove(&self, key: &TreeKey) -> Proof {
        let hasher = self.hasher();
        let mut internals = Vec::new();
        let mut node = self.root();
        let mut depth = 0;

        let (terminal, value) = loop {
            match node {
                Node::Empty => break (None, None),
                Node::Stem(stem_node) if stem_node.stem == key.stem => {
                    let proof_node = ProofNode::Stem {
                        stem: stem_node.stem,
                        subtree_siblings: stem_node.subtree_siblings(key.subindex, hasher),
                    };
                    break (Some(proof_node), stem_node.get_value(key.subindex).cloned());
                }
                Node::Stem(stem_node) => {
                    let proof_node = ProofNode::Extension {
                        stem: stem_node.stem,
                        subtree_root: stem_node.subtree_root(hasher),
                    };
                    break (Some(proof_node), None);
                }
                Node::Internal(internal) => {
                    let bit = key.stem.bit_at(depth);
                    internals.push(ProofNode::Internal {
                        sibling: internal.child(!bit).hash(hasher),
                        direction: Direction::from_bit(bit),
                    });
                    node = internal.child(bit);
                    depth += 1;
                }
            }
        };

        debug!(
            "Generated proof for {:?} (depth: {}, present: {})",
            key,
            depth,
            value.is_some()
        );

        let path = terminal.into_iter().chain(internals.into_iter().rev()).collect();
        Proof::new(*key, value, path)
    }
}
