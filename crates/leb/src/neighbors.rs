use serde::{Deserialize, Serialize};
use subdiv_cbt::depth_of;

use crate::decode::{Domain, bit, winding_flipped};

/// Same-depth nodes sharing an edge with a node's decoded triangle.
///
/// `left` shares `v0 - v1`, `right` shares `v1 - v2` and `edge` shares the
/// longest edge `v2 - v0`. A value of 0 means that edge lies on the root
/// boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbors {
    pub left: u64,
    pub right: u64,
    pub edge: u64,
}

impl Neighbors {
    /// Neighbor ids with the boundary sentinels dropped.
    pub fn iter(&self) -> impl Iterator<Item = u64> {
        [self.left, self.right, self.edge]
            .into_iter()
            .filter(|&id| id != 0)
    }
}

/// Running neighbor set while walking down the tree; `node` is the current id.
#[derive(Debug, Clone, Copy)]
struct Walk {
    left: u64,
    right: u64,
    edge: u64,
    node: u64,
}

impl Walk {
    fn split(self, side: u64) -> Self {
        let Walk {
            left,
            right,
            edge,
            node,
        } = self;
        if side == 0 {
            Walk {
                left: (node << 1) | 1,
                right: (edge << 1) | u64::from(edge != 0),
                edge: (right << 1) | u64::from(right != 0),
                node: node << 1,
            }
        } else {
            Walk {
                left: edge << 1,
                right: node << 1,
                edge: left << 1,
                node: (node << 1) | 1,
            }
        }
    }
}

/// Neighbors of `id` in the square domain.
pub fn neighbors(id: u64) -> Neighbors {
    neighbors_in(Domain::Square, id)
}

/// Neighbors of `id` for an explicit root [`Domain`]. Bit arithmetic only; no
/// geometry is decoded.
pub fn neighbors_in(domain: Domain, id: u64) -> Neighbors {
    debug_assert!(id != 0, "node id 0 has no neighbors");
    let depth = depth_of(id.max(1));

    let (mut walk, splits) = match domain {
        Domain::Square if depth == 0 => return Neighbors::default(),
        Domain::Square => {
            let half = bit(id, depth - 1);
            let start = Walk {
                left: 0,
                right: 0,
                edge: 3 - half,
                node: 2 + half,
            };
            (start, depth - 1)
        }
        Domain::Triangle => {
            let start = Walk {
                left: 0,
                right: 0,
                edge: 0,
                node: 1,
            };
            (start, depth)
        }
    };
    for index in (0..splits).rev() {
        walk = walk.split(bit(id, index));
    }
    debug_assert_eq!(walk.node, id);

    // The walk labels sides before the winding fix; unflipped nodes see them mirrored.
    let (left, right) = if winding_flipped(domain, depth) {
        (walk.left, walk.right)
    } else {
        (walk.right, walk.left)
    };
    Neighbors {
        left,
        right,
        edge: walk.edge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_in;
    use crate::triangle::Triangle;
    use glam::Vec2;

    const E: f32 = 64.0;

    fn edges(t: &Triangle) -> [(Vec2, Vec2); 3] {
        let [v0, v1, v2] = t.vertices;
        [(v0, v1), (v1, v2), (v2, v0)]
    }

    fn same_edge(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> bool {
        (a.0 == b.0 && a.1 == b.1) || (a.0 == b.1 && a.1 == b.0)
    }

    fn on_boundary((p, q): (Vec2, Vec2), domain: Domain) -> bool {
        let square = (p.x == q.x && (p.x == 0.0 || p.x == E))
            || (p.y == q.y && (p.y == 0.0 || p.y == E));
        match domain {
            Domain::Square => square,
            Domain::Triangle => square || (p.x + p.y == E && q.x + q.y == E),
        }
    }

    fn check_domain(domain: Domain, depths: std::ops::Range<u32>) {
        for depth in depths {
            for id in (1u64 << depth)..(2u64 << depth) {
                let t = decode_in(domain, id, depth, E);
                let n = neighbors_in(domain, id);
                for (edge, neighbor) in edges(&t).into_iter().zip([n.left, n.right, n.edge]) {
                    if neighbor == 0 {
                        assert!(
                            on_boundary(edge, domain),
                            "{domain:?} id={id}: interior edge without neighbor"
                        );
                        continue;
                    }
                    assert_eq!(depth_of(neighbor), depth);
                    let other = decode_in(domain, neighbor, depth, E);
                    assert!(
                        edges(&other).into_iter().any(|e| same_edge(e, edge)),
                        "{domain:?} id={id}: neighbor {neighbor} does not share the edge"
                    );
                }
            }
        }
    }

    #[test]
    fn square_neighbors_share_edges() {
        check_domain(Domain::Square, 1..9);
    }

    #[test]
    fn triangle_neighbors_share_edges() {
        check_domain(Domain::Triangle, 0..9);
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        for depth in 1..9 {
            for id in (1u64 << depth)..(2u64 << depth) {
                for other in neighbors(id).iter() {
                    assert!(neighbors(other).iter().any(|back| back == id));
                }
            }
        }
    }

    #[test]
    fn first_split_halves_see_each_other_across_the_diagonal() {
        assert_eq!(
            neighbors(2),
            Neighbors {
                left: 0,
                right: 0,
                edge: 3
            }
        );
        assert_eq!(neighbors(3).edge, 2);
    }

    #[test]
    fn root_has_no_neighbors() {
        assert_eq!(neighbors(1), Neighbors::default());
        assert_eq!(neighbors_in(Domain::Triangle, 1), Neighbors::default());
        assert_eq!(neighbors(1).iter().count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "node id 0 has no neighbors")]
    fn zero_id_fails_fast() {
        neighbors(0);
    }
}
