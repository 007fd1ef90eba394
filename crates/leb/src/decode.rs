use glam::Vec2;
use serde::{Deserialize, Serialize};
use subdiv_cbt::NodeId;

use crate::triangle::Triangle;

/// Shape of the root a tree subdivides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// A square of side `extents`. The first split cuts it along its diagonal,
    /// so depth `d >= 1` holds `2^d` triangles tiling the whole square.
    #[default]
    Square,
    /// The lower-left half of the square; the root node is that triangle.
    Triangle,
}

/// Value of bit `index` of `id`; bits past the word are zero.
pub(crate) fn bit(id: u64, index: u32) -> u64 {
    id.checked_shr(index).unwrap_or(0) & 1
}

/// Whether decoding at `depth` ends with a `v0`/`v2` swap to restore
/// counter-clockwise winding. Every bisection reverses orientation.
pub(crate) fn winding_flipped(domain: Domain, depth: u32) -> bool {
    match domain {
        Domain::Square => depth > 0 && depth % 2 == 0,
        Domain::Triangle => depth % 2 == 1,
    }
}

/// Iterative longest-edge bisection state.
///
/// Holds the current triangle as `[v0, v1, v2]` with `v1` the apex opposite
/// the longest edge. Each step applies one of two fixed affine maps; the
/// orientation alternates until [`Bisector::finish`] fixes it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bisector {
    v: [Vec2; 3],
}

impl Bisector {
    /// Lower-left half of the root square: `(0,E) (0,0) (E,0)`.
    pub(crate) fn base(extents: f32) -> Self {
        Self {
            v: [
                Vec2::new(0.0, extents),
                Vec2::ZERO,
                Vec2::new(extents, 0.0),
            ],
        }
    }

    /// Pick one half of the square: 0 keeps the base triangle, 1 the upper-right one.
    pub(crate) fn select_half(&mut self, half: u64) {
        if half == 1 {
            let [v0, v1, v2] = self.v;
            self.v = [v2, v0 - v1 + v2, v0];
        }
    }

    fn midpoint(&self) -> Vec2 {
        (self.v[0] + self.v[2]) * 0.5
    }

    /// Bisect the longest edge and keep child `side` (0 or 1).
    pub(crate) fn split(&mut self, side: u64) {
        let m = self.midpoint();
        let [v0, v1, v2] = self.v;
        self.v = if side == 0 { [v0, m, v1] } else { [v1, m, v2] };
    }

    pub(crate) fn finish(self, flip: bool) -> Triangle {
        let [v0, v1, v2] = self.v;
        if flip {
            Triangle::new(v2, v1, v0)
        } else {
            Triangle::new(v0, v1, v2)
        }
    }
}

/// Decode node `id` at `depth` to its triangle in the root square of side `extents`.
///
/// `id` must lie in `[2^depth, 2^(depth + 1))`; other ids trip a debug
/// assertion and decode to a meaningless triangle in release builds. The root
/// of the square (depth 0) has no triangle of its own and decodes to the base
/// (lower-left) half.
pub fn decode(id: u64, depth: u32, extents: f32) -> Triangle {
    decode_in(Domain::Square, id, depth, extents)
}

/// [`decode`] for an explicit root [`Domain`].
pub fn decode_in(domain: Domain, id: u64, depth: u32, extents: f32) -> Triangle {
    debug_assert!(
        NodeId::at_depth(id, depth).is_ok(),
        "node id {id} does not lie at depth {depth}"
    );

    let mut state = Bisector::base(extents);
    let splits = match domain {
        Domain::Square if depth == 0 => return state.finish(false),
        Domain::Square => {
            state.select_half(bit(id, depth - 1));
            depth - 1
        }
        Domain::Triangle => depth,
    };
    for index in (0..splits).rev() {
        state.split(bit(id, index));
    }
    state.finish(winding_flipped(domain, depth))
}

/// Approximate footprint size: half the distance between `v0` and `v1`.
///
/// Uses one leg of the triangle, not its circumradius. LOD thresholds are
/// tuned against this value, so keep the formula as is.
pub fn footprint_radius(id: u64, depth: u32, extents: f32) -> f32 {
    footprint_radius_in(Domain::Square, id, depth, extents)
}

/// [`footprint_radius`] for an explicit root [`Domain`].
pub fn footprint_radius_in(domain: Domain, id: u64, depth: u32, extents: f32) -> f32 {
    let [v0, v1, _] = decode_in(domain, id, depth, extents).vertices;
    v0.distance(v1) * 0.5
}
