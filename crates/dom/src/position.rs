//! Tree order comparison (`compareDocumentPosition`)

use std::ops::BitOr;

use crate::error::DomResult;
use crate::node::NodeId;
use crate::tree::DomTree;

/// Bitmask returned by [`DomTree::compare_document_position`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentPosition(u16);

impl DocumentPosition {
    /// The two nodes are in different trees
    pub const DISCONNECTED: Self = Self(0x01);
    /// The other node comes first
    pub const PRECEDING: Self = Self(0x02);
    /// The other node comes later
    pub const FOLLOWING: Self = Self(0x04);
    /// The other node is an ancestor
    pub const CONTAINS: Self = Self(0x08);
    /// The other node is a descendant
    pub const CONTAINED_BY: Self = Self(0x10);
    pub const IMPLEMENTATION_SPECIFIC: Self = Self(0x20);

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains_flag(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn is_same_node(self) -> bool {
        self.0 == 0
    }

    pub fn is_disconnected(self) -> bool {
        self.contains_flag(Self::DISCONNECTED)
    }

    pub fn is_preceding(self) -> bool {
        self.contains_flag(Self::PRECEDING)
    }

    pub fn is_following(self) -> bool {
        self.contains_flag(Self::FOLLOWING)
    }

    pub fn is_contains(self) -> bool {
        self.contains_flag(Self::CONTAINS)
    }

    pub fn is_contained_by(self) -> bool {
        self.contains_flag(Self::CONTAINED_BY)
    }

    pub fn is_implementation_specific(self) -> bool {
        self.contains_flag(Self::IMPLEMENTATION_SPECIFIC)
    }
}

impl BitOr for DocumentPosition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl DomTree {
    /// `node.compareDocumentPosition(other)`
    ///
    /// Both parent chains are collected up to their roots. Different roots
    /// give `DISCONNECTED | IMPLEMENTATION_SPECIFIC | PRECEDING`. When one
    /// chain ends in the other the nodes are in an ancestor relation.
    /// Otherwise the chains are compared from the root down and the sibling
    /// order below the lowest common ancestor decides.
    ///
    /// Attribute nodes get no special treatment: an Attr has no parent, so
    /// it compares as the root of its own tree.
    pub fn compare_document_position(&self, node: NodeId, other: NodeId) -> DomResult<DocumentPosition> {
        if node == other {
            return Ok(DocumentPosition::default());
        }
        self.node(node)?;
        self.node(other)?;

        // Chains start at the node itself and end at the root
        let mut other_chain = vec![other];
        let mut node_chain = vec![node];
        let mut other_root = other;
        let mut node_root = node;
        loop {
            let other_parent = self.parent_node(other_root);
            let node_parent = self.parent_node(node_root);
            if other_parent.is_none() && node_parent.is_none() {
                break;
            }
            if let Some(parent) = other_parent {
                other_chain.push(parent);
                other_root = parent;
            }
            if let Some(parent) = node_parent {
                node_chain.push(parent);
                node_root = parent;
            }
        }

        if other_root != node_root {
            return Ok(DocumentPosition::DISCONNECTED
                | DocumentPosition::IMPLEMENTATION_SPECIFIC
                | DocumentPosition::PRECEDING);
        }

        let longer_is_other = other_chain.len() > node_chain.len();
        let (longer, shorter) = if longer_is_other {
            (&other_chain, &node_chain)
        } else {
            (&node_chain, &other_chain)
        };
        let longer_start = longer.len() - shorter.len();

        if longer[longer_start] == shorter[0] {
            return Ok(if longer_is_other {
                DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING
            } else {
                DocumentPosition::CONTAINS | DocumentPosition::PRECEDING
            });
        }

        for i in (0..shorter.len()).rev() {
            let shorter_node = shorter[i];
            let longer_node = longer[longer_start + i];
            if shorter_node == longer_node {
                continue;
            }
            // Both hang off the same parent, the last shared chain entry
            let shorter_index = self.index_in_parent(shorter_node);
            let longer_index = self.index_in_parent(longer_node);
            let other_first = if shorter_index < longer_index {
                !longer_is_other
            } else {
                longer_is_other
            };
            return Ok(if other_first {
                DocumentPosition::PRECEDING
            } else {
                DocumentPosition::FOLLOWING
            });
        }

        // Chains of equal roots always diverge before this point
        Ok(DocumentPosition::FOLLOWING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `root > (a, b)`, `a > c`
    fn fixture() -> (DomTree, [NodeId; 4]) {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let root = tree.create_element(doc, "div").unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let c = tree.create_element(doc, "i").unwrap();
        tree.append(root, vec![a.into(), b.into()]).unwrap();
        tree.append_child(a, c).unwrap();
        (tree, [root, a, b, c])
    }

    #[test]
    fn test_siblings_across_levels() {
        let (tree, [_, _, b, c]) = fixture();
        assert_eq!(
            tree.compare_document_position(c, b).unwrap(),
            DocumentPosition::FOLLOWING
        );
        assert_eq!(
            tree.compare_document_position(b, c).unwrap(),
            DocumentPosition::PRECEDING
        );
    }

    #[test]
    fn test_containment() {
        let (tree, [root, a, _, c]) = fixture();
        let down = tree.compare_document_position(root, a).unwrap();
        assert!(down.is_contained_by() && down.is_following());
        let up = tree.compare_document_position(a, root).unwrap();
        assert!(up.is_contains() && up.is_preceding());
        let deep = tree.compare_document_position(c, root).unwrap();
        assert_eq!(deep, DocumentPosition::CONTAINS | DocumentPosition::PRECEDING);
    }

    #[test]
    fn test_complementary() {
        let (tree, nodes) = fixture();
        for &x in &nodes {
            for &y in &nodes {
                if x == y {
                    assert!(tree.compare_document_position(x, y).unwrap().is_same_node());
                    continue;
                }
                let xy = tree.compare_document_position(x, y).unwrap();
                let yx = tree.compare_document_position(y, x).unwrap();
                assert_eq!(xy.is_preceding(), yx.is_following());
                assert_eq!(xy.is_contains(), yx.is_contained_by());
            }
        }
    }

    #[test]
    fn test_disconnected() {
        let (mut tree, [root, ..]) = fixture();
        let doc = tree.document_id();
        let loose = tree.create_element(doc, "p").unwrap();
        let position = tree.compare_document_position(root, loose).unwrap();
        assert_eq!(position.bits(), 0x01 | 0x20 | 0x02);
        assert!(position.is_disconnected() && position.is_implementation_specific());
    }
}
