//! Fixed-arity faces with closed-form ray tests, plus the `Face3` union.
//!
//! - `Triangle3d`: Möller–Trumbore.
//! - `Quad3d`: Lagae–Dutré (planar convex quads, vertices in ring order).
//! - `Face3`: one of the above or a general `Polygon3d`; clipping demotes to
//!   `Polygon` whenever the kept vertex count no longer matches the arity.

use nalgebra::{Matrix4, Point3, Vector3};

use super::plane::Plane;
use super::polygon::Polygon3d;
use super::types::{orient3d, Aabb3};
use crate::cfg::{DET_EPS, RAY_T_EPS};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle3d {
    pub points: [Point3<f64>; 3],
}

impl Triangle3d {
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { points: [a, b, c] }
    }

    /// Möller–Trumbore; returns `t` for hits strictly in front of the origin.
    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        let [v0, v1, v2] = self.points;
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let p = dir.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() <= DET_EPS * (e1.norm() * e2.norm() * dir.norm()).max(1.0) {
            return None;
        }
        let inv = 1.0 / det;
        let s = origin - v0;
        let u = s.dot(&p) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = dir.dot(&q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&q) * inv;
        (t > RAY_T_EPS).then_some(t)
    }

    pub fn is_facing(&self, p: &Point3<f64>) -> bool {
        orient3d(&self.points[0], &self.points[1], &self.points[2], p) > 0.0
    }

    pub fn to_polygon(&self) -> Polygon3d {
        Polygon3d::new(self.points.to_vec())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad3d {
    /// Ring order `v00, v10, v11, v01`.
    pub points: [Point3<f64>; 4],
}

impl Quad3d {
    #[inline]
    pub fn new(points: [Point3<f64>; 4]) -> Self {
        Self { points }
    }

    /// Lagae–Dutré ray/quad test; returns `t` for hits strictly in front.
    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        let [v00, v10, v11, v01] = self.points;
        // Reject rays hitting the plane left of v00v01 or right of v00v10.
        let e01 = v10 - v00;
        let e03 = v01 - v00;
        let p = dir.cross(&e03);
        let det = e01.dot(&p);
        let scale = (e01.norm() * e03.norm() * dir.norm()).max(1.0);
        if det.abs() <= DET_EPS * scale {
            return None;
        }
        let inv = 1.0 / det;
        let t_vec = origin - v00;
        let alpha = t_vec.dot(&p) * inv;
        if alpha < 0.0 {
            return None;
        }
        let q = t_vec.cross(&e01);
        let beta = dir.dot(&q) * inv;
        if beta < 0.0 {
            return None;
        }
        if alpha + beta > 1.0 {
            // Reject rays hitting the plane right of v11v10 or left of v11v01.
            let e23 = v01 - v11;
            let e21 = v10 - v11;
            let p2 = dir.cross(&e21);
            let det2 = e23.dot(&p2);
            if det2.abs() <= DET_EPS * scale {
                return None;
            }
            let inv2 = 1.0 / det2;
            let t2 = origin - v11;
            let alpha2 = t2.dot(&p2) * inv2;
            if alpha2 < 0.0 {
                return None;
            }
            let q2 = t2.cross(&e23);
            let beta2 = dir.dot(&q2) * inv2;
            if beta2 < 0.0 {
                return None;
            }
        }
        let t = e03.dot(&q) * inv;
        (t > RAY_T_EPS).then_some(t)
    }

    pub fn is_facing(&self, p: &Point3<f64>) -> bool {
        orient3d(&self.points[0], &self.points[1], &self.points[2], p) > 0.0
    }

    pub fn to_polygon(&self) -> Polygon3d {
        Polygon3d::new(self.points.to_vec())
    }
}

/// A face of an obstacle or target: triangle, quad, or general polygon.
#[derive(Clone, Debug, PartialEq)]
pub enum Face3 {
    Triangle(Triangle3d),
    Quad(Quad3d),
    Polygon(Polygon3d),
}

impl Face3 {
    /// Pick the tightest representation for `points`.
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        match points.len() {
            3 => Face3::Triangle(Triangle3d::new(points[0], points[1], points[2])),
            4 => Face3::Quad(Quad3d::new([points[0], points[1], points[2], points[3]])),
            _ => Face3::Polygon(Polygon3d::new(points)),
        }
    }

    pub fn points(&self) -> &[Point3<f64>] {
        match self {
            Face3::Triangle(t) => &t.points,
            Face3::Quad(q) => &q.points,
            Face3::Polygon(p) => p.points(),
        }
    }

    /// Minimum vertex count for this variant to be valid.
    pub fn min_vertices(&self) -> usize {
        match self {
            Face3::Triangle(_) => 3,
            Face3::Quad(_) => 4,
            Face3::Polygon(_) => 3,
        }
    }

    pub fn to_polygon(&self) -> Polygon3d {
        match self {
            Face3::Triangle(t) => t.to_polygon(),
            Face3::Quad(q) => q.to_polygon(),
            Face3::Polygon(p) => p.clone(),
        }
    }

    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(self.points())
    }

    pub fn plane(&self) -> Option<Plane> {
        let p = self.points();
        match self {
            Face3::Polygon(poly) => poly.plane(),
            _ => Plane::from_points(&p[0], &p[1], &p[2]),
        }
    }

    pub fn is_facing(&self, p: &Point3<f64>) -> bool {
        match self {
            Face3::Triangle(t) => t.is_facing(p),
            Face3::Quad(q) => q.is_facing(p),
            Face3::Polygon(poly) => poly.is_facing(p),
        }
    }

    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        match self {
            Face3::Triangle(t) => t.ray_intersection(origin, dir),
            Face3::Quad(q) => q.ray_intersection(origin, dir),
            Face3::Polygon(poly) => poly.ray_intersection(origin, dir),
        }
    }

    pub fn transform(&self, m: &Matrix4<f64>) -> Face3 {
        let pts = self.points().iter().map(|p| m.transform_point(p)).collect();
        self.with_points(pts)
    }

    pub fn clip_z(&self, plane_z: f64, keep_less_than: bool) -> Face3 {
        let clipped = self.to_polygon().clip_z(plane_z, keep_less_than);
        self.with_points(clipped.into_points())
    }

    pub fn clip_plane(&self, plane: &Plane, keep_front: bool) -> Face3 {
        let clipped = self.to_polygon().clip_plane(plane, keep_front);
        self.with_points(clipped.into_points())
    }

    pub fn reversed(&self) -> Face3 {
        let mut pts = self.points().to_vec();
        pts.reverse();
        self.with_points(pts)
    }

    /// `clean()` then check the vertex count for this variant.
    pub fn is_valid(&self) -> bool {
        let mut poly = self.to_polygon();
        poly.is_valid_with(self.min_vertices())
    }

    /// Keep the variant if the arity still matches, else demote.
    fn with_points(&self, pts: Vec<Point3<f64>>) -> Face3 {
        match (self, pts.len()) {
            (Face3::Triangle(_), 3) => Face3::Triangle(Triangle3d::new(pts[0], pts[1], pts[2])),
            (Face3::Quad(_), 4) => Face3::Quad(Quad3d::new([pts[0], pts[1], pts[2], pts[3]])),
            _ => Face3::Polygon(Polygon3d::new(pts)),
        }
    }
}

impl From<Polygon3d> for Face3 {
    fn from(p: Polygon3d) -> Self {
        Face3::Polygon(p)
    }
}
