//! Ordered traversal of the tree.

use alloy_primitives::Bytes;

use crate::{Node, StemNode, SubIndex, TreeKey, STEM_SUBTREE_WIDTH};

/// Iterator over the stem nodes of a tree, left to right.
///
/// Left-to-right is ascending bit-path order, which is the same as ascending
/// byte order of the stems.
#[derive(Debug)]
pub struct Stems<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Stems<'a> {
    pub(super) fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Stems<'a> {
    type Item = &'a StemNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Empty => {}
                Node::Stem(stem_node) => return Some(stem_node),
                Node::Internal(internal) => {
                    self.stack.push(internal.right.as_ref());
                    self.stack.push(internal.left.as_ref());
                }
            }
        }
        None
    }
}

/// Iterator over `(key, value)` pairs in key order.
#[derive(Debug)]
pub struct Iter<'a> {
    stems: Stems<'a>,
    current: Option<&'a StemNode>,
    next_slot: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(stems: Stems<'a>) -> Self {
        Self {
            stems,
            current: None,
            next_slot: 0,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (TreeKey, &'a Bytes);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let stem_node = match self.current {
                Some(stem_node) => stem_node,
                None => {
                    self.current = Some(self.stems.next()?);
                    self.next_slot = 0;
                    continue;
                }
            };

            while self.next_slot < STEM_SUBTREE_WIDTH {
                let subindex = self.next_slot as SubIndex;
                self.next_slot += 1;
                if let Some(value) = stem_node.get_value(subindex) {
                    return Some((TreeKey::new(stem_node.stem, subindex), value));
                }
            }
            self.current = None;
        }
    }
}
