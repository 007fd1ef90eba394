use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Deepest level whose ids fit in a `u64`.
pub const MAX_DEPTH: u32 = 63;

/// Depth of a raw node id: `floor(log2(id))`. The root (1) has depth 0.
///
/// `id` must be non-zero.
pub fn depth_of(id: u64) -> u32 {
    debug_assert!(id != 0, "node id 0 has no depth");
    id.checked_ilog2().unwrap_or(0)
}

/// The two children of a raw node id.
pub fn children_of(id: u64) -> (u64, u64) {
    (id << 1, (id << 1) | 1)
}

/// Parent of a raw node id, `None` for the root.
pub fn parent_of(id: u64) -> Option<u64> {
    (id > 1).then_some(id >> 1)
}

/// A node of the concise binary tree, always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct NodeId(u64);

/// Errors from constructing a [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NodeIdError {
    #[error("node id 0 is the \"no node\" sentinel, not a tree node")]
    Zero,
    #[error("node id {id} is not at depth {depth}")]
    WrongDepth { id: u64, depth: u32 },
    #[error("depth {0} exceeds the maximum tree depth")]
    DepthTooLarge(u32),
}

impl NodeId {
    pub const ROOT: NodeId = NodeId(1);

    pub fn new(id: u64) -> Result<Self, NodeIdError> {
        if id == 0 {
            return Err(NodeIdError::Zero);
        }
        Ok(Self(id))
    }

    /// Build a node id and check it lies at `depth`.
    pub fn at_depth(id: u64, depth: u32) -> Result<Self, NodeIdError> {
        let range = Self::range_at_depth(depth)?;
        if !range.contains(&id) {
            return Err(NodeIdError::WrongDepth { id, depth });
        }
        Ok(Self(id))
    }

    /// Ids of every node at `depth`: `[2^depth, 2^(depth + 1))`.
    pub fn range_at_depth(depth: u32) -> Result<Range<u64>, NodeIdError> {
        if depth > MAX_DEPTH {
            return Err(NodeIdError::DepthTooLarge(depth));
        }
        let first = 1u64 << depth;
        // Depth 63 would end past u64::MAX; clip it.
        let end = first.checked_shl(1).filter(|&e| e != 0).unwrap_or(u64::MAX);
        Ok(first..end)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn depth(self) -> u32 {
        depth_of(self.0)
    }

    pub fn is_root(self) -> bool {
        self.0 == 1
    }

    pub fn parent(self) -> Option<Self> {
        parent_of(self.0).map(Self)
    }

    /// Both children, or `None` when they would overflow the id space.
    pub fn children(self) -> Option<(Self, Self)> {
        (self.depth() < MAX_DEPTH).then(|| {
            let (left, right) = children_of(self.0);
            (Self(left), Self(right))
        })
    }

    /// The other child of this node's parent.
    pub fn sibling(self) -> Option<Self> {
        (!self.is_root()).then_some(Self(self.0 ^ 1))
    }

    /// Ancestor of this node at `depth`, or `None` if `depth` is deeper than the node.
    pub fn ancestor_at_depth(self, depth: u32) -> Option<Self> {
        let own = self.depth();
        (depth <= own).then(|| Self(self.0 >> (own - depth)))
    }

    /// Whether `self` is `other` or lies on the path from the root to `other`.
    pub fn is_ancestor_of(self, other: NodeId) -> bool {
        other.ancestor_at_depth(self.depth()) == Some(self)
    }
}

impl TryFrom<u64> for NodeId {
    type Error = NodeIdError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<NodeId> for u64 {
    fn from(node: NodeId) -> u64 {
        node.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_depth_zero_and_no_parent() {
        assert_eq!(depth_of(1), 0);
        assert_eq!(parent_of(1), None);
        assert!(NodeId::ROOT.is_root());
        assert_eq!(NodeId::ROOT.sibling(), None);
    }

    #[test]
    fn children_are_one_level_deeper() {
        for id in 1..4096u64 {
            let (a, b) = children_of(id);
            assert_eq!(depth_of(a), depth_of(id) + 1);
            assert_eq!(depth_of(b), depth_of(id) + 1);
            assert_eq!(parent_of(a), Some(id));
            assert_eq!(parent_of(b), Some(id));
        }
    }

    #[test]
    fn depth_bounds_hold() {
        for id in [1u64, 2, 3, 4, 7, 8, 1023, 1024, u64::MAX] {
            let d = depth_of(id);
            assert!(1u64 << d <= id);
            if d < 63 {
                assert!(id < 2u64 << d);
            }
        }
        assert_eq!(depth_of(u64::MAX), 63);
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(NodeId::new(0), Err(NodeIdError::Zero));
        assert_eq!(NodeId::try_from(0u64), Err(NodeIdError::Zero));
    }

    #[test]
    fn at_depth_checks_range() {
        assert!(NodeId::at_depth(4, 2).is_ok());
        assert!(NodeId::at_depth(7, 2).is_ok());
        assert_eq!(
            NodeId::at_depth(8, 2),
            Err(NodeIdError::WrongDepth { id: 8, depth: 2 })
        );
        assert_eq!(
            NodeId::at_depth(1, 64),
            Err(NodeIdError::DepthTooLarge(64))
        );
    }

    #[test]
    fn range_at_depth_matches_heap_numbering() {
        assert_eq!(NodeId::range_at_depth(0), Ok(1..2));
        assert_eq!(NodeId::range_at_depth(2), Ok(4..8));
        assert_eq!(NodeId::range_at_depth(63), Ok(1u64 << 63..u64::MAX));
    }

    #[test]
    fn siblings_and_ancestors() {
        let n = NodeId::new(13).unwrap(); // 0b1101
        assert_eq!(n.depth(), 3);
        assert_eq!(n.sibling(), NodeId::new(12).ok());
        assert_eq!(n.ancestor_at_depth(1), NodeId::new(3).ok());
        assert_eq!(n.ancestor_at_depth(3), Some(n));
        assert_eq!(n.ancestor_at_depth(4), None);
        assert!(NodeId::new(6).unwrap().is_ancestor_of(n));
        assert!(!NodeId::new(7).unwrap().is_ancestor_of(n));
    }

    #[test]
    fn children_stop_at_max_depth() {
        let deepest = NodeId::at_depth(1 << MAX_DEPTH, MAX_DEPTH).unwrap();
        assert!(deepest.children().is_none());
        let (l, r) = NodeId::ROOT.children().unwrap();
        assert_eq!((l.get(), r.get()), (2, 3));
    }

    #[test]
    fn conversions_route_through_new() {
        assert!(NodeId::try_from(0u64).is_err());
        assert_eq!(u64::from(NodeId::try_from(5u64).unwrap()), 5);
    }
}
