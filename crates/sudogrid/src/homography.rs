//! Planar projective mapping between the unit square and a quadrilateral.

use nalgebra::{Matrix3, Vector3};

use crate::geometry::Point;

/// A 3×3 homography applied to homogeneous 2-D coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Homography(Matrix3<f64>);

impl Homography {
    /// Projective map taking the unit square (0,0), (1,0), (1,1), (0,1) to
    /// `corners` given as TL, TR, BR, BL.
    ///
    /// Follows the square-to-quadrilateral construction of Digital Image
    /// Warping §2.11. Returns `None` for degenerate quadrilaterals.
    pub fn unit_square_to_quad(corners: &[Point; 4]) -> Option<Self> {
        let [p0, p1, p2, p3] = corners.map(|p| (p.x as f64, p.y as f64));

        let sx = p0.0 - p1.0 + p2.0 - p3.0;
        let sy = p0.1 - p1.1 + p2.1 - p3.1;
        let (dx1, dy1) = (p1.0 - p2.0, p1.1 - p2.1);
        let (dx2, dy2) = (p3.0 - p2.0, p3.1 - p2.1);

        let matrix = if sx == 0.0 && sy == 0.0 {
            // The fourth corner is implied by the other three: affine map.
            Matrix3::new(
                p1.0 - p0.0,
                p3.0 - p0.0,
                p0.0,
                p1.1 - p0.1,
                p3.1 - p0.1,
                p0.1,
                0.0,
                0.0,
                1.0,
            )
        } else {
            let det = dx1 * dy2 - dx2 * dy1;
            if det == 0.0 {
                return None;
            }
            let g = (sx * dy2 - dx2 * sy) / det;
            let h = (dx1 * sy - sx * dy1) / det;
            Matrix3::new(
                p1.0 - p0.0 + g * p1.0,
                p3.0 - p0.0 + h * p3.0,
                p0.0,
                p1.1 - p0.1 + g * p1.1,
                p3.1 - p0.1 + h * p3.1,
                p0.1,
                g,
                h,
                1.0,
            )
        };
        Some(Self(matrix))
    }

    /// Map a point from the unit square into the quadrilateral.
    pub fn apply(&self, u: f64, v: f64) -> (f64, f64) {
        let p = self.0 * Vector3::new(u, v, 1.0);
        (p.x / p.z, p.y / p.z)
    }

    /// Row-major coefficient array, for serialization and inspection.
    pub fn coefficients(&self) -> [[f64; 3]; 3] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    fn assert_maps_to(h: &Homography, uv: (f64, f64), expected: Point) {
        let (x, y) = h.apply(uv.0, uv.1);
        assert!(
            (x - expected.x as f64).abs() < 1e-9 && (y - expected.y as f64).abs() < 1e-9,
            "({}, {}) mapped to ({x}, {y}), expected {expected:?}",
            uv.0,
            uv.1
        );
    }

    #[test]
    fn axis_aligned_rectangle_is_affine() {
        let corners = [
            point(10.0, 20.0),
            point(110.0, 20.0),
            point(110.0, 220.0),
            point(10.0, 220.0),
        ];
        let h = Homography::unit_square_to_quad(&corners).unwrap();
        assert_maps_to(&h, (0.0, 0.0), corners[0]);
        assert_maps_to(&h, (1.0, 0.0), corners[1]);
        assert_maps_to(&h, (1.0, 1.0), corners[2]);
        assert_maps_to(&h, (0.0, 1.0), corners[3]);
        assert_maps_to(&h, (0.5, 0.5), point(60.0, 120.0));
    }

    #[test]
    fn skewed_quadrilateral_maps_all_corners() {
        let corners = [
            point(15.0, 8.0),
            point(140.0, 22.0),
            point(128.0, 150.0),
            point(4.0, 132.0),
        ];
        let h = Homography::unit_square_to_quad(&corners).unwrap();
        assert_maps_to(&h, (0.0, 0.0), corners[0]);
        assert_maps_to(&h, (1.0, 0.0), corners[1]);
        assert_maps_to(&h, (1.0, 1.0), corners[2]);
        assert_maps_to(&h, (0.0, 1.0), corners[3]);
    }

    #[test]
    fn collapsed_quadrilateral_is_rejected() {
        let p = point(50.0, 50.0);
        // Three coincident corners leave the difference vectors parallel.
        let corners = [p, p, point(60.0, 60.0), p];
        assert!(Homography::unit_square_to_quad(&corners).is_none());
    }
}
