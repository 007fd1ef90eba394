//! Longest-edge bisection (LEB): geometry for concise-binary-tree node ids.
//!
//! A node id is decoded into its triangle by replaying the bisections its bits
//! encode, starting from a square of side `extents`. Nothing is stored; every
//! query works from the bare id.
//!
//! # Invariants
//! - Both children of a node cover exactly half of its area.
//! - All nodes of one depth tile the root square with no gaps or overlaps.
//! - Decoded triangles are counter-clockwise, `v1` is the apex and `v2 - v0`
//!   the longest edge.

mod decode;
mod locate;
mod neighbors;
mod triangle;

pub use decode::{Domain, decode, decode_in, footprint_radius, footprint_radius_in};
pub use locate::{locate, locate_brute_force, locate_for_object};
pub use neighbors::{Neighbors, neighbors, neighbors_in};
pub use triangle::{Triangle, wedge};

pub fn crate_info() -> &'static str {
    "subdiv-leb v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("leb"));
    }
}
