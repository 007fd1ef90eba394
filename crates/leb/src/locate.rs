use glam::{Vec2, Vec3};
use subdiv_cbt::NodeId;
use subdiv_common::{MAX_LOCATE_DEPTH, RegionHandle, RegionKey, derive_key};

use crate::decode::{Bisector, Domain, decode, winding_flipped};

/// Margin, as a fraction of `extents`, by which a point may sit outside an
/// inner node and still have that node's subtree searched. Covers rounding in
/// the decoded vertices so a leaf that contains the point is never pruned.
const DESCENT_TOLERANCE: f32 = 1e-5;

fn in_square(x: f32, y: f32, extents: f32) -> bool {
    (0.0..=extents).contains(&x) && (0.0..=extents).contains(&y)
}

fn clamp_depth(depth: u32) -> u32 {
    if depth > MAX_LOCATE_DEPTH {
        tracing::warn!(depth, max = MAX_LOCATE_DEPTH, "locate depth clamped");
        MAX_LOCATE_DEPTH
    } else {
        depth
    }
}

/// Node at `depth` whose triangle contains `(x, y)`, or 0 if none does.
///
/// Walks down from the root trying child 1 before child 0 and skipping
/// subtrees the point is clearly outside of, so away from edges the cost is
/// O(depth). Leaves are tested with the same closed wedge test and the same
/// vertices as [`decode`], which makes the result identical to
/// [`locate_brute_force`]: when a point lies on an edge shared by several
/// triangles the highest node id wins. Depth 0 returns the root (1) for any
/// point in the square. Depths past [`MAX_LOCATE_DEPTH`] are clamped.
pub fn locate(x: f32, y: f32, depth: u32, extents: f32) -> u64 {
    if !in_square(x, y, extents) {
        return 0;
    }
    let depth = clamp_depth(depth);
    if depth == 0 {
        return 1;
    }

    let descent = Descent {
        p: Vec2::new(x, y),
        depth,
        tolerance: extents * DESCENT_TOLERANCE,
    };
    match descent.highest_leaf(Bisector::base(extents), 1, 0) {
        Some(id) => {
            tracing::trace!(x, y, depth, id, "located");
            id
        }
        None => {
            tracing::warn!(x, y, depth, "no triangle contains point");
            0
        }
    }
}

struct Descent {
    p: Vec2,
    depth: u32,
    tolerance: f32,
}

impl Descent {
    /// Highest-id leaf below node `id` (at `level`, with triangle `state`)
    /// whose triangle contains the point.
    fn highest_leaf(&self, state: Bisector, id: u64, level: u32) -> Option<u64> {
        if level == self.depth {
            let leaf = state.finish(winding_flipped(Domain::Square, level));
            return leaf.contains_xy(self.p.x, self.p.y).then_some(id);
        }
        let level = level + 1;
        [1, 0].into_iter().find_map(|side| {
            let mut child = state;
            if level == 1 {
                child.select_half(side);
            } else {
                child.split(side);
            }
            let worth_visiting = level == self.depth
                || child
                    .finish(winding_flipped(Domain::Square, level))
                    .near_xy(self.p, self.tolerance);
            if worth_visiting {
                self.highest_leaf(child, (id << 1) | side, level)
            } else {
                None
            }
        })
    }
}

/// Reference point location: scan every node at `depth` from the highest id
/// down and return the first whose triangle contains `(x, y)`.
///
/// Costs O(2^depth) decodes. Returns 0 when no triangle contains the point.
pub fn locate_brute_force(x: f32, y: f32, depth: u32, extents: f32) -> u64 {
    if !in_square(x, y, extents) {
        return 0;
    }
    let depth = clamp_depth(depth);
    if depth == 0 {
        return 1;
    }
    NodeId::range_at_depth(depth).map_or(0, |ids| {
        ids.rev()
            .find(|&id| decode(id, depth, extents).contains_xy(x, y))
            .unwrap_or(0)
    })
}

/// Region key and node for an object at `position` in region `handle`.
///
/// The key's slab comes from `position.z`; the node from `(x, y)`.
pub fn locate_for_object(
    handle: impl Into<RegionHandle>,
    position: Vec3,
    depth: u32,
    extents: f32,
) -> (RegionKey, u64) {
    let key = derive_key(handle, f64::from(position.z));
    (key, locate(position.x, position.y, depth, extents))
}
