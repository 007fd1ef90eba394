use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D cross product of two edge vectors.
pub fn wedge(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Footprint of one subdivision node in the XY plane.
///
/// Decoded triangles are counter-clockwise, `v1` is the right-angle apex and
/// `v2 -> v0` is the longest edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Vec2; 3],
}

impl Triangle {
    pub fn new(v0: Vec2, v1: Vec2, v2: Vec2) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Signed area, positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f32 {
        let [a, b, c] = self.vertices;
        0.5 * wedge(b - a, c - a)
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn centroid(&self) -> Vec2 {
        let [a, b, c] = self.vertices;
        (a + b + c) / 3.0
    }

    /// Closed point-in-triangle test: all three edge wedges must be non-negative.
    ///
    /// Points on an edge or vertex count as inside, so a point on an edge shared
    /// by two triangles is inside both.
    pub fn contains_xy(&self, x: f32, y: f32) -> bool {
        let p = Vec2::new(x, y);
        let [v0, v1, v2] = self.vertices;
        let w0 = wedge(v1 - v0, p - v0);
        let w1 = wedge(v2 - v1, p - v1);
        let w2 = wedge(v0 - v2, p - v2);
        w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
    }

    /// Like [`Triangle::contains_xy`] but lets the point sit up to `tolerance`
    /// outside each edge.
    pub(crate) fn near_xy(&self, p: Vec2, tolerance: f32) -> bool {
        let [v0, v1, v2] = self.vertices;
        [(v0, v1), (v1, v2), (v2, v0)].into_iter().all(|(a, b)| {
            let edge = b - a;
            wedge(edge, p - a) >= -tolerance * edge.length()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Triangle {
        Triangle::new(Vec2::new(0.0, 4.0), Vec2::ZERO, Vec2::new(4.0, 0.0))
    }

    #[test]
    fn area_and_winding() {
        let t = base();
        assert_eq!(t.signed_area(), 8.0);
        let [a, b, c] = t.vertices;
        let flipped = Triangle::new(c, b, a);
        assert_eq!(flipped.signed_area(), -8.0);
        assert_eq!(flipped.area(), 8.0);
    }

    #[test]
    fn contains_interior_edges_and_vertices() {
        let t = base();
        assert!(t.contains_xy(1.0, 1.0));
        assert!(t.contains_xy(2.0, 2.0)); // on the hypotenuse
        assert!(t.contains_xy(0.0, 0.0));
        assert!(!t.contains_xy(3.0, 3.0));
        assert!(!t.contains_xy(-0.1, 1.0));
    }

    #[test]
    fn clockwise_triangle_rejects_everything_inside() {
        let [a, b, c] = base().vertices;
        let flipped = Triangle::new(c, b, a);
        assert!(!flipped.contains_xy(1.0, 1.0));
    }

    #[test]
    fn centroid() {
        let c = base().centroid();
        assert!((c - Vec2::new(4.0 / 3.0, 4.0 / 3.0)).length() < 1e-6);
    }

    #[test]
    fn near_allows_a_margin_outside_edges() {
        let t = base();
        assert!(!t.contains_xy(-0.01, 1.0));
        assert!(t.near_xy(Vec2::new(-0.01, 1.0), 0.05));
        assert!(!t.near_xy(Vec2::new(-0.1, 1.0), 0.05));
        // Past the hypotenuse: the wedge is scaled by the edge length.
        assert!(t.near_xy(Vec2::new(2.02, 2.02), 0.05));
        assert!(!t.near_xy(Vec2::new(2.1, 2.1), 0.05));
    }
}
