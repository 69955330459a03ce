//! Oriented plane in 3D: unit normal plus a reference point.
//!
//! Conventions
//! - `signed_distance(p) > 0` means `p` is on the normal side ("front").
//! - Intersections return `None` for parallel or degenerate inputs instead of
//!   failing; an edge-on wall is routine, not an error.

use nalgebra::{Matrix3, Point2, Point3, Unit, Vector3};

use crate::cfg::{DET_EPS, EPS};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Unit<Vector3<f64>>,
    pub point: Point3<f64>,
}

impl Plane {
    #[inline]
    pub fn new(normal: Unit<Vector3<f64>>, point: Point3<f64>) -> Self {
        Self { normal, point }
    }

    /// Plane through `a, b, c` with normal `(b - a) × (c - a)`.
    ///
    /// Returns `None` for (near) collinear points.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        let scale = (b - a).norm() * (c - a).norm();
        if !len.is_finite() || len <= EPS * scale.max(1.0) {
            return None;
        }
        Some(Self {
            normal: Unit::new_unchecked(n / len),
            point: *a,
        })
    }

    /// Horizontal plane at elevation `z`, normal pointing up.
    pub fn horizontal(z: f64) -> Self {
        Self {
            normal: Vector3::z_axis(),
            point: Point3::new(0.0, 0.0, z),
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    /// Side of `p`: `1` front, `-1` back, `0` on the plane (within `EPS`).
    #[inline]
    pub fn which_side(&self, p: &Point3<f64>) -> i8 {
        let d = self.signed_distance(p);
        if d > EPS {
            1
        } else if d < -EPS {
            -1
        } else {
            0
        }
    }

    /// Flipped copy (same point set, opposite front side).
    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            point: self.point,
        }
    }

    /// Ray parameter `t` with `origin + t * dir` on the plane.
    ///
    /// `None` when the ray is parallel to the plane. Negative `t` is returned
    /// as-is; callers decide whether rays extend backwards.
    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        let denom = self.normal.dot(dir);
        if denom.abs() <= DET_EPS * dir.norm().max(1.0) {
            return None;
        }
        let t = self.normal.dot(&(self.point - origin)) / denom;
        t.is_finite().then_some(t)
    }

    /// Intersection of the closed segment `a..b` with the plane.
    ///
    /// Endpoints on the plane count. A segment lying in the plane returns `None`.
    pub fn segment_intersection(&self, a: &Point3<f64>, b: &Point3<f64>) -> Option<Point3<f64>> {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        if da.abs() <= EPS && db.abs() <= EPS {
            return None;
        }
        if da.abs() <= EPS {
            return Some(*a);
        }
        if db.abs() <= EPS {
            return Some(*b);
        }
        if (da > 0.0) == (db > 0.0) {
            return None;
        }
        let t = da / (da - db);
        Some(a + (b - a) * t)
    }

    /// Line of intersection with another plane as `(point, unit direction)`.
    ///
    /// `None` for parallel (or coincident) planes.
    pub fn intersect_plane(&self, other: &Plane) -> Option<(Point3<f64>, Unit<Vector3<f64>>)> {
        let dir = self.normal.cross(other.normal.as_ref());
        if dir.norm_squared() <= EPS * EPS {
            return None;
        }
        // Solve for the point on both planes closest to the origin along `dir`.
        let d1 = self.normal.dot(&self.point.coords);
        let d2 = other.normal.dot(&other.point.coords);
        let m = Matrix3::from_rows(&[
            self.normal.transpose(),
            other.normal.transpose(),
            dir.transpose(),
        ]);
        let inv = m.try_inverse()?;
        let p = inv * Vector3::new(d1, d2, 0.0);
        Some((Point3::from(p), Unit::new_normalize(dir)))
    }

    /// Orthonormal in-plane basis `(u, v)` with `u × v = normal`.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal.into_inner();
        // Pick the world axis least aligned with the normal.
        let helper = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
            Vector3::x()
        } else if n.y.abs() <= n.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = helper.cross(&n).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// Coordinates of `p` in the in-plane frame anchored at `self.point`.
    #[inline]
    pub fn to_2d(&self, basis: &(Vector3<f64>, Vector3<f64>), p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.point;
        Point2::new(d.dot(&basis.0), d.dot(&basis.1))
    }

    /// Inverse of `to_2d`.
    #[inline]
    pub fn from_2d(&self, basis: &(Vector3<f64>, Vector3<f64>), q: &Point2<f64>) -> Point3<f64> {
        self.point + basis.0 * q.x + basis.1 * q.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    #[test]
    fn from_points_normal_follows_winding() {
        let p = Plane::from_points(
            &point![0.0, 0.0, 0.0],
            &point![1.0, 0.0, 0.0],
            &point![0.0, 1.0, 0.0],
        )
        .unwrap();
        assert!((p.normal.z - 1.0).abs() < 1e-12);
        assert_eq!(p.which_side(&point![0.0, 0.0, 2.0]), 1);
        assert_eq!(p.which_side(&point![5.0, -3.0, 0.0]), 0);
        assert!(Plane::from_points(
            &point![0.0, 0.0, 0.0],
            &point![1.0, 1.0, 1.0],
            &point![2.0, 2.0, 2.0]
        )
        .is_none());
    }

    #[test]
    fn ray_and_segment_intersections() {
        let p = Plane::horizontal(10.0);
        let t = p
            .ray_intersection(&point![0.0, 0.0, 0.0], &Vector3::new(0.0, 0.0, 2.0))
            .unwrap();
        assert!((t - 5.0).abs() < 1e-12);
        assert!(p
            .ray_intersection(&point![0.0, 0.0, 0.0], &Vector3::new(1.0, 0.0, 0.0))
            .is_none());
        let hit = p
            .segment_intersection(&point![0.0, 0.0, 0.0], &point![4.0, 0.0, 20.0])
            .unwrap();
        assert!((hit - point![2.0, 0.0, 10.0]).norm() < 1e-12);
        assert!(p
            .segment_intersection(&point![0.0, 0.0, 0.0], &point![0.0, 0.0, 5.0])
            .is_none());
    }

    #[test]
    fn plane_plane_line() {
        let a = Plane::horizontal(2.0);
        let b = Plane::new(Vector3::x_axis(), point![3.0, 0.0, 0.0]);
        let (p, dir) = a.intersect_plane(&b).unwrap();
        assert!((p.x - 3.0).abs() < 1e-12 && (p.z - 2.0).abs() < 1e-12);
        assert!(dir.y.abs() > 1.0 - 1e-12);
        assert!(a.intersect_plane(&Plane::horizontal(5.0)).is_none());
    }

    #[test]
    fn planar_coordinates_roundtrip() {
        let p = Plane::from_points(
            &point![1.0, 2.0, 3.0],
            &point![2.0, 2.5, 3.0],
            &point![1.0, 2.0, 4.0],
        )
        .unwrap();
        let basis = p.basis();
        assert!(basis.0.cross(&basis.1).dot(p.normal.as_ref()) > 1.0 - 1e-12);
        let q = point![1.5, 2.25, 3.7];
        let back = p.from_2d(&basis, &p.to_2d(&basis, &q));
        assert!((back - q).norm() < 1e-12);
    }
}
