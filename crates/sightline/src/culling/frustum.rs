//! Vision triangle extruded between two elevations.

use nalgebra::{Point2, Point3, Vector3};

use super::triangle::VisionTriangle;
use crate::cfg::{EPS, MAX_ELEVATION};
use crate::geom3::{Aabb3, Rect2};

#[derive(Clone, Debug)]
pub struct Frustum {
    pub triangle: VisionTriangle,
    pub bottom: f64,
    pub top: f64,
    bounds: Aabb3,
}

impl Frustum {
    /// Frustum from `viewpoint` to a target with plan-view `outline` and
    /// elevation range `[target_bottom, target_top]`.
    pub fn new(
        viewpoint: &Point3<f64>,
        outline: &[Point2<f64>],
        target_bottom: f64,
        target_top: f64,
    ) -> Self {
        let triangle = VisionTriangle::build(Point2::new(viewpoint.x, viewpoint.y), outline);
        let bottom = viewpoint.z.min(target_bottom).max(-MAX_ELEVATION);
        let top = viewpoint.z.max(target_top).min(MAX_ELEVATION);
        let r = triangle.bounds();
        let bounds = Aabb3::new(
            Point3::new(r.min.x, r.min.y, bottom),
            Point3::new(r.max.x, r.max.y, top),
        );
        Self {
            triangle,
            bottom,
            top,
            bounds,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb3 {
        self.bounds
    }

    /// Plan-view rectangle for spatial-index queries.
    #[inline]
    pub fn rect(&self) -> Rect2 {
        self.bounds.to_rect()
    }

    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        p.z >= self.bottom - EPS
            && p.z <= self.top + EPS
            && self.triangle.contains_point(&Point2::new(p.x, p.y))
    }

    /// Whether a planar face may reach into the frustum.
    ///
    /// SAT against the bounding box first, then the plan-view footprint
    /// against the vision triangle.
    pub fn contains_face(&self, points: &[Point3<f64>]) -> bool {
        if points.is_empty() || !polygon_overlaps_aabb(points, &self.bounds) {
            return false;
        }
        let footprint: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
        self.triangle.intersects_ring(&footprint)
    }
}

/// Separating-axis test of a convex planar polygon against a box.
///
/// Axes: the three box axes, the polygon normal, and each polygon edge
/// crossed with each box axis.
pub fn polygon_overlaps_aabb(points: &[Point3<f64>], b: &Aabb3) -> bool {
    let c = b.center();
    let h = b.half_extents();
    let separated = |axis: &Vector3<f64>| {
        let len2 = axis.norm_squared();
        if len2 <= EPS * EPS {
            return false;
        }
        let r = h.x * axis.x.abs() + h.y * axis.y.abs() + h.z * axis.z.abs();
        let mid = axis.dot(&c.coords);
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            let d = axis.dot(&p.coords);
            lo = lo.min(d);
            hi = hi.max(d);
        }
        let slack = EPS * len2.sqrt();
        lo > mid + r + slack || hi < mid - r - slack
    };
    let box_axes = [Vector3::x(), Vector3::y(), Vector3::z()];
    if box_axes.iter().any(|a| separated(a)) {
        return false;
    }
    let n = points.len();
    if n >= 3 {
        let normal = newell(points);
        if separated(&normal) {
            return false;
        }
    }
    for i in 0..n {
        let e = points[(i + 1) % n] - points[i];
        for a in &box_axes {
            if separated(&e.cross(a)) {
                return false;
            }
        }
    }
    true
}

fn newell(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut acc = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc.x += (a.y - b.y) * (a.z + b.z);
        acc.y += (a.z - b.z) * (a.x + b.x);
        acc.z += (a.x - b.x) * (a.y + b.y);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn unit_box() -> Aabb3 {
        Aabb3::new(point![0.0, 0.0, 0.0], point![1.0, 1.0, 1.0])
    }

    #[test]
    fn sat_box_axes_and_normal() {
        let b = unit_box();
        let inside = [point![0.2, 0.2, 0.5], point![0.8, 0.2, 0.5], point![0.5, 0.8, 0.5]];
        assert!(polygon_overlaps_aabb(&inside, &b));
        let above = [point![0.2, 0.2, 2.0], point![0.8, 0.2, 2.0], point![0.5, 0.8, 2.0]];
        assert!(!polygon_overlaps_aabb(&above, &b));
        // Tilted plane x + y + z = 3.5 misses the box (max 3) though the
        // axis-aligned extents touch.
        let tilted = [point![1.5, 1.0, 1.0], point![1.0, 1.5, 1.0], point![1.0, 1.0, 1.5]];
        assert!(!polygon_overlaps_aabb(&tilted, &b));
    }

    #[test]
    fn sat_edge_axes() {
        // Horizontal triangle past the box's (1, 0) corner, separated only by
        // an edge crossed with the z axis.
        let b = unit_box();
        let tri = [point![0.8, -0.5, 0.5], point![1.8, 0.5, 0.5], point![1.8, -0.5, 0.5]];
        assert!(!polygon_overlaps_aabb(&tri, &b));
        let crossing = [point![0.4, -0.5, 0.5], point![1.4, 0.5, 0.5], point![1.4, -0.5, 0.5]];
        assert!(polygon_overlaps_aabb(&crossing, &b));
    }

    #[test]
    fn frustum_culls_by_footprint_and_height() {
        let outline = [
            point![90.0, -10.0],
            point![110.0, -10.0],
            point![110.0, 10.0],
            point![90.0, 10.0],
        ];
        let f = Frustum::new(&point![0.0, 0.0, 5.0], &outline, 0.0, 50.0);
        assert_eq!(f.bottom, 0.0);
        assert_eq!(f.top, 50.0);
        let wall = |x: f64, z0: f64, z1: f64| {
            vec![
                point![x, -20.0, z0],
                point![x, -20.0, z1],
                point![x, 20.0, z1],
                point![x, 20.0, z0],
            ]
        };
        assert!(f.contains_face(&wall(50.0, 0.0, 10.0)));
        assert!(!f.contains_face(&wall(50.0, 60.0, 80.0)));
        assert!(!f.contains_face(&wall(-50.0, 0.0, 10.0)));
        assert!(f.contains_point(&point![100.0, 0.0, 25.0]));
    }
}
