//! Concise binary tree (CBT) addressing.
//!
//! A perfect binary tree that exists only as integer arithmetic: node ids use
//! heap numbering (root = 1, children of `n` are `2n` and `2n + 1`), so the id
//! alone fixes a node's depth and position. Nothing is ever allocated.
//!
//! # Invariants
//! - A node at depth `d` has `2^d <= id < 2^(d+1)`.
//! - Children are exactly one level deeper than their parent.

mod node;

pub use node::{MAX_DEPTH, NodeId, NodeIdError, children_of, depth_of, parent_of};

pub fn crate_info() -> &'static str {
    "subdiv-cbt v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("cbt"));
    }
}
