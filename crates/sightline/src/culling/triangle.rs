//! Plan-view vision triangle from a viewpoint to a target outline.

use nalgebra::{Point2, Vector2};

use crate::cfg::EPS;
use crate::geom3::{orient2d, point_in_ring, Rect2};

/// Triangle `viewpoint, left, right` that covers the target outline, or the
/// plain bounding rectangle when no such triangle exists (viewpoint inside
/// the target, or the target spans half the view or more).
#[derive(Clone, Debug, PartialEq)]
pub enum VisionTriangle {
    Triangle([Point2<f64>; 3]),
    Bounds(Rect2),
}

impl VisionTriangle {
    /// Build from a viewpoint and the target's outline (plan view).
    ///
    /// The two outline points at the angular extremes, seen from the
    /// viewpoint, are extended along their sight rays to the line
    /// perpendicular to the view direction. That line passes through the
    /// outline point farthest along the view, not through the target center:
    /// the triangle then holds the whole outline and is a superset of the
    /// center-line triangle, so it never culls anything that one keeps.
    ///
    /// A two-point outline (a segment) uses both points as the extremes. A
    /// single point has no width and falls back to the bounding rectangle.
    pub fn build(viewpoint: Point2<f64>, outline: &[Point2<f64>]) -> Self {
        let fallback = Rect2::from_points(outline.iter().chain(std::iter::once(&viewpoint)));
        if outline.len() < 2 {
            return VisionTriangle::Bounds(fallback);
        }
        if outline.len() >= 3 && point_in_ring(&viewpoint, outline) {
            return VisionTriangle::Bounds(fallback);
        }
        let center = outline
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords)
            / outline.len() as f64;
        let to_center = Point2::from(center) - viewpoint;
        let dist = to_center.norm();
        if dist <= EPS {
            return VisionTriangle::Bounds(fallback);
        }
        let dir = to_center / dist;
        let perp = Vector2::new(-dir.y, dir.x);

        // Angular extremes around the view direction (left is +perp).
        let angle = |p: &Point2<f64>| {
            let d = p - viewpoint;
            d.dot(&perp).atan2(d.dot(&dir))
        };
        let mut left = outline[0];
        let mut right = outline[0];
        let (mut a_left, mut a_right) = (angle(&left), angle(&right));
        for p in &outline[1..] {
            let a = angle(p);
            if a > a_left {
                a_left = a;
                left = *p;
            }
            if a < a_right {
                a_right = a;
                right = *p;
            }
        }
        if a_left - a_right >= std::f64::consts::PI - EPS
            || a_left >= std::f64::consts::FRAC_PI_2
            || a_right <= -std::f64::consts::FRAC_PI_2
        {
            return VisionTriangle::Bounds(fallback);
        }
        let reach = outline
            .iter()
            .map(|p| (p - viewpoint).dot(&dir))
            .fold(f64::NEG_INFINITY, f64::max);
        let extend = |p: Point2<f64>| {
            let d = p - viewpoint;
            let along = d.dot(&dir);
            viewpoint + d * (reach / along)
        };
        let b = extend(left);
        let c = extend(right);
        // Counter-clockwise: viewpoint, right, left.
        VisionTriangle::Triangle([viewpoint, c, b])
    }

    pub fn bounds(&self) -> Rect2 {
        match self {
            VisionTriangle::Triangle(t) => Rect2::from_points(t.iter()),
            VisionTriangle::Bounds(r) => *r,
        }
    }

    /// Closed containment.
    pub fn contains_point(&self, p: &Point2<f64>) -> bool {
        match self {
            VisionTriangle::Triangle([a, b, c]) => {
                orient2d(a, b, p) >= -EPS && orient2d(b, c, p) >= -EPS && orient2d(c, a, p) >= -EPS
            }
            VisionTriangle::Bounds(r) => r.contains(p),
        }
    }

    /// Does the closed shape share a point with the ring (or segment, for a
    /// two-point ring)?
    pub fn intersects_ring(&self, ring: &[Point2<f64>]) -> bool {
        if ring.is_empty() {
            return false;
        }
        if ring.iter().any(|p| self.contains_point(p)) {
            return true;
        }
        let corners = self.corners();
        if ring.len() >= 3 && corners.iter().any(|c| point_in_ring(c, ring)) {
            return true;
        }
        let m = corners.len();
        let n = ring.len();
        (0..m).any(|i| {
            let (a, b) = (corners[i], corners[(i + 1) % m]);
            (0..n).any(|j| segments_intersect(&a, &b, &ring[j], &ring[(j + 1) % n]))
        })
    }

    fn corners(&self) -> Vec<Point2<f64>> {
        match self {
            VisionTriangle::Triangle(t) => t.to_vec(),
            VisionTriangle::Bounds(r) => vec![
                r.min,
                Point2::new(r.max.x, r.min.y),
                r.max,
                Point2::new(r.min.x, r.max.y),
            ],
        }
    }
}

/// Closed segment intersection test.
pub fn segments_intersect(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> bool {
    let d1 = orient2d(c, d, a);
    let d2 = orient2d(c, d, b);
    let d3 = orient2d(a, b, c);
    let d4 = orient2d(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let on = |p: &Point2<f64>, q: &Point2<f64>, r: &Point2<f64>, o: f64| {
        o == 0.0
            && r.x >= p.x.min(q.x)
            && r.x <= p.x.max(q.x)
            && r.y >= p.y.min(q.y)
            && r.y <= p.y.max(q.y)
    };
    on(c, d, a, d1) || on(c, d, b, d2) || on(a, b, c, d3) || on(a, b, d, d4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn square(cx: f64, cy: f64, h: f64) -> Vec<Point2<f64>> {
        vec![
            point![cx - h, cy - h],
            point![cx + h, cy - h],
            point![cx + h, cy + h],
            point![cx - h, cy + h],
        ]
    }

    #[test]
    fn triangle_covers_the_target() {
        let target = square(100.0, 20.0, 10.0);
        let tri = VisionTriangle::build(point![0.0, 0.0], &target);
        assert!(matches!(tri, VisionTriangle::Triangle(_)));
        for p in &target {
            assert!(tri.contains_point(p), "corner {p:?}");
        }
        assert!(tri.contains_point(&point![100.0, 20.0]));
        assert!(!tri.contains_point(&point![50.0, -40.0]));
    }

    #[test]
    fn viewpoint_inside_target_falls_back_to_bounds() {
        let target = square(0.0, 0.0, 10.0);
        let tri = VisionTriangle::build(point![1.0, 1.0], &target);
        assert!(matches!(tri, VisionTriangle::Bounds(_)));
        assert!(tri.contains_point(&point![-9.0, 9.0]));
    }

    #[test]
    fn short_outlines() {
        let seg = [point![100.0, -10.0], point![100.0, 10.0]];
        let tri = VisionTriangle::build(point![0.0, 0.0], &seg);
        assert!(matches!(tri, VisionTriangle::Triangle(_)));
        assert!(seg.iter().all(|p| tri.contains_point(p)));

        let dot = VisionTriangle::build(point![0.0, 0.0], &[point![100.0, 0.0]]);
        assert!(matches!(dot, VisionTriangle::Bounds(_)));
        assert!(dot.contains_point(&point![50.0, 0.0]));
    }

    #[test]
    fn ring_and_segment_intersections() {
        let tri = VisionTriangle::build(point![0.0, 0.0], &square(100.0, 0.0, 10.0));
        // Wall crossing the sightline.
        assert!(tri.intersects_ring(&[point![50.0, -50.0], point![50.0, 50.0]]));
        // Wall off to the side.
        assert!(!tri.intersects_ring(&[point![50.0, 30.0], point![60.0, 80.0]]));
        // Big square around the viewpoint contains the apex.
        assert!(tri.intersects_ring(&square(0.0, 0.0, 5.0)));
        assert!(segments_intersect(
            &point![0.0, 0.0],
            &point![2.0, 0.0],
            &point![1.0, 0.0],
            &point![1.0, 5.0]
        ));
    }
}
