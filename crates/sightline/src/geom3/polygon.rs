//! Planar polygon in 3D with lazily cached derived data.
//!
//! Invariants (caller responsibility)
//! - All points coplanar; the polygon is simple (no self-intersections).
//! - Winding encodes facing: counter-clockwise when viewed from the front,
//!   so the right-hand normal `(p1 - p0) × (p2 - p0)` points out of the front.
//!
//! Caches
//! - Bounds, plane, centroid and the in-plane 2D projection are computed at
//!   most once per point-set and are all cleared together by every mutator.

use std::fmt;
use std::sync::OnceLock;

use nalgebra::{Matrix4, Point2, Point3, Vector3};

use super::plane::Plane;
use super::triangulate::{earcut, is_convex, point_in_ring, signed_area2};
use super::types::{orient3d, Aabb3};
use crate::cfg::{COLLINEAR_EPS, DIST2_EPS, EPS, RAY_T_EPS};

/// Errors for inputs that violate a documented precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Fewer vertices than the shape requires.
    TooFewVertices { found: usize, min: usize },
    /// A plane crossed the polygon boundary more than twice.
    NonConvexCrossing { crossings: usize },
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeomError::TooFewVertices { found, min } => {
                write!(f, "polygon has {found} vertices, needs at least {min}")
            }
            GeomError::NonConvexCrossing { crossings } => write!(
                f,
                "plane crosses polygon boundary at {crossings} points (non-convex or self-intersecting)"
            ),
        }
    }
}

impl std::error::Error for GeomError {}

/// Result of intersecting a convex polygon with a plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaneCrossing {
    /// Entirely on one side.
    Miss,
    /// Touches the plane in a single point (vertex).
    Touch(Point3<f64>),
    /// Crosses the plane along a segment.
    Segment(Point3<f64>, Point3<f64>),
    /// Lies in the plane.
    Coplanar,
}

#[derive(Clone, Debug)]
struct Planar {
    plane: Plane,
    basis: (Vector3<f64>, Vector3<f64>),
    points: Vec<Point2<f64>>,
}

/// Ordered, mutable list of coplanar points.
#[derive(Clone, Default)]
pub struct Polygon3d {
    points: Vec<Point3<f64>>,
    bounds: OnceLock<Aabb3>,
    plane: OnceLock<Option<Plane>>,
    centroid: OnceLock<Point3<f64>>,
    planar: OnceLock<Option<Planar>>,
}

impl fmt::Debug for Polygon3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Polygon3d")
            .field("points", &self.points)
            .finish()
    }
}

impl PartialEq for Polygon3d {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Polygon3d {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// Horizontal polygon at elevation `z` from plan-view points.
    ///
    /// `face_up` selects the front side: the ring is re-wound so that the
    /// front faces `+z` (seen from above) or `-z`.
    pub fn from_xy(ring: &[Point2<f64>], z: f64, face_up: bool) -> Self {
        let ccw = signed_area2(ring) > 0.0;
        let mut pts: Vec<Point3<f64>> = ring.iter().map(|p| Point3::new(p.x, p.y, z)).collect();
        if ccw != face_up {
            pts.reverse();
        }
        Self::new(pts)
    }

    /// Vertical rectangle over the plan-view segment `a → b`.
    ///
    /// Front side is to the left of `a → b` (counter-clockwise plan-view
    /// orientation, x right and y up).
    pub fn vertical_quad(a: Point2<f64>, b: Point2<f64>, bottom: f64, top: f64) -> Self {
        Self::new(vec![
            Point3::new(a.x, a.y, bottom),
            Point3::new(a.x, a.y, top),
            Point3::new(b.x, b.y, top),
            Point3::new(b.x, b.y, bottom),
        ])
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }

    /// Edges as `(start, end)` pairs, closing the ring.
    pub fn edges(&self) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (&self.points[i], &self.points[(i + 1) % n]))
    }

    // ---- mutation (every mutator clears every cache) ----

    fn invalidate(&mut self) {
        self.bounds = OnceLock::new();
        self.plane = OnceLock::new();
        self.centroid = OnceLock::new();
        self.planar = OnceLock::new();
    }

    pub fn set_points(&mut self, points: Vec<Point3<f64>>) {
        self.points = points;
        self.invalidate();
    }

    pub fn set_point(&mut self, i: usize, p: Point3<f64>) {
        self.points[i] = p;
        self.invalidate();
    }

    pub fn push_point(&mut self, p: Point3<f64>) {
        self.points.push(p);
        self.invalidate();
    }

    /// Reverse the winding in place (swaps front and back).
    pub fn reverse_orientation(&mut self) {
        self.points.reverse();
        self.invalidate();
    }

    pub fn reversed(&self) -> Polygon3d {
        let mut pts = self.points.clone();
        pts.reverse();
        Polygon3d::new(pts)
    }

    /// Remove duplicate and near-collinear vertices. Idempotent.
    ///
    /// Returns `true` if anything was removed.
    pub fn clean(&mut self) -> bool {
        let before = self.points.len();
        let mut pts = std::mem::take(&mut self.points);
        loop {
            let n = pts.len();
            if n < 3 {
                break;
            }
            let mut removed = false;
            let mut i = 0;
            while i < pts.len() && pts.len() >= 3 {
                let m = pts.len();
                let prev = pts[(i + m - 1) % m];
                let cur = pts[i];
                let next = pts[(i + 1) % m];
                let e0 = cur - prev;
                let e1 = next - cur;
                let dup = e0.norm_squared() <= DIST2_EPS;
                let collinear =
                    e0.cross(&e1).norm() <= COLLINEAR_EPS * (e0.norm() * e1.norm()).max(DIST2_EPS);
                if dup || collinear {
                    pts.remove(i);
                    removed = true;
                } else {
                    i += 1;
                }
            }
            if !removed {
                break;
            }
        }
        self.points = pts;
        let changed = self.points.len() != before;
        if changed {
            self.invalidate();
        }
        changed
    }

    /// `clean()` then check the vertex count against `min_vertices`.
    pub fn is_valid_with(&mut self, min_vertices: usize) -> bool {
        self.clean();
        self.points.len() >= min_vertices && self.plane().is_some()
    }

    /// `clean()` then require at least 3 vertices spanning a plane.
    pub fn is_valid(&mut self) -> bool {
        self.is_valid_with(3)
    }

    // ---- cached derived data ----

    pub fn bounds(&self) -> Aabb3 {
        *self.bounds.get_or_init(|| Aabb3::from_points(&self.points))
    }

    /// Plane of the first three non-collinear vertices, oriented by winding.
    pub fn plane(&self) -> Option<Plane> {
        *self.plane.get_or_init(|| {
            let n = self.points.len();
            if n < 3 {
                return None;
            }
            let a = self.points[0];
            for i in 1..n - 1 {
                for j in i + 1..n {
                    if let Some(p) = Plane::from_points(&a, &self.points[i], &self.points[j]) {
                        // Orient by the polygon's overall winding (Newell normal).
                        let newell = self.newell_normal();
                        return Some(if newell.dot(p.normal.as_ref()) < 0.0 {
                            p.flipped()
                        } else {
                            p
                        });
                    }
                }
            }
            None
        })
    }

    fn newell_normal(&self) -> Vector3<f64> {
        let n = self.points.len();
        let mut acc = Vector3::zeros();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            acc.x += (a.y - b.y) * (a.z + b.z);
            acc.y += (a.z - b.z) * (a.x + b.x);
            acc.z += (a.x - b.x) * (a.y + b.y);
        }
        acc
    }

    fn planar(&self) -> Option<&Planar> {
        self.planar
            .get_or_init(|| {
                let plane = self.plane()?;
                let basis = plane.basis();
                let points = self.points.iter().map(|p| plane.to_2d(&basis, p)).collect();
                Some(Planar {
                    plane,
                    basis,
                    points,
                })
            })
            .as_ref()
    }

    /// Vertices in the polygon's own in-plane frame (counter-clockwise).
    pub fn planar_points(&self) -> Option<&[Point2<f64>]> {
        self.planar().map(|p| p.points.as_slice())
    }

    /// Area-weighted centroid; vertex average for degenerate polygons.
    pub fn centroid(&self) -> Point3<f64> {
        *self.centroid.get_or_init(|| {
            if let Some(planar) = self.planar() {
                let pts = &planar.points;
                let n = pts.len();
                let mut a2 = 0.0;
                let mut cx = 0.0;
                let mut cy = 0.0;
                for i in 0..n {
                    let p = pts[i];
                    let q = pts[(i + 1) % n];
                    let cross = p.x * q.y - q.x * p.y;
                    a2 += cross;
                    cx += (p.x + q.x) * cross;
                    cy += (p.y + q.y) * cross;
                }
                if a2.abs() > EPS {
                    let c = Point2::new(cx / (3.0 * a2), cy / (3.0 * a2));
                    return planar.plane.from_2d(&planar.basis, &c);
                }
            }
            vertex_average(&self.points)
        })
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        self.planar()
            .map(|p| signed_area2(&p.points).abs() * 0.5)
            .unwrap_or(0.0)
    }

    pub fn is_convex(&self) -> bool {
        self.planar().map(|p| is_convex(&p.points)).unwrap_or(false)
    }

    /// `true` if `p` lies strictly on the front side.
    ///
    /// Uses the orientation of the first three vertices; falls back to the
    /// cached plane when those are collinear.
    pub fn is_facing(&self, p: &Point3<f64>) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let o = orient3d(&self.points[0], &self.points[1], &self.points[2], p);
        let scale = (self.points[1] - self.points[0]).norm() * (self.points[2] - self.points[0]).norm();
        if o.abs() > EPS * scale.max(1.0) {
            return o > 0.0;
        }
        self.plane()
            .map(|pl| pl.signed_distance(p) > EPS)
            .unwrap_or(false)
    }

    // ---- transforms and clipping ----

    /// Apply a homogeneous transform (with perspective divide) to every vertex.
    pub fn transform(&self, m: &Matrix4<f64>) -> Polygon3d {
        let mut out = Polygon3d::default();
        self.transform_into(m, &mut out);
        out
    }

    /// Like `transform`, reusing `out`'s allocation.
    pub fn transform_into(&self, m: &Matrix4<f64>, out: &mut Polygon3d) {
        let mut pts = std::mem::take(&mut out.points);
        pts.clear();
        pts.extend(self.points.iter().map(|p| m.transform_point(p)));
        out.set_points(pts);
    }

    /// Clip against the plane `z = plane_z`.
    ///
    /// Keeps `z <= plane_z` if `keep_less_than`, else `z >= plane_z`. Crossing
    /// points are placed exactly on the plane so re-clipping is a no-op.
    pub fn clip_z(&self, plane_z: f64, keep_less_than: bool) -> Polygon3d {
        let inside = |p: &Point3<f64>| {
            if keep_less_than {
                p.z <= plane_z
            } else {
                p.z >= plane_z
            }
        };
        let n = self.points.len();
        let mut out: Vec<Point3<f64>> = Vec::with_capacity(n + 2);
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let (ain, bin) = (inside(&a), inside(&b));
            if ain {
                out.push(a);
            }
            if ain != bin {
                let t = (plane_z - a.z) / (b.z - a.z);
                let mut c = a + (b - a) * t;
                c.z = plane_z;
                out.push(c);
            }
        }
        dedup_ring(&mut out);
        Polygon3d::new(out)
    }

    /// Clip against an arbitrary plane, keeping the front (or back) half-space.
    ///
    /// Points within `EPS` of the plane count as inside.
    pub fn clip_plane(&self, plane: &Plane, keep_front: bool) -> Polygon3d {
        let sd = |p: &Point3<f64>| {
            let d = plane.signed_distance(p);
            if keep_front {
                d
            } else {
                -d
            }
        };
        let n = self.points.len();
        let mut out: Vec<Point3<f64>> = Vec::with_capacity(n + 2);
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let (da, db) = (sd(&a), sd(&b));
            let (ain, bin) = (da >= -EPS, db >= -EPS);
            if ain {
                out.push(a);
            }
            if ain != bin {
                let t = da / (da - db);
                out.push(a + (b - a) * t);
            }
        }
        dedup_ring(&mut out);
        Polygon3d::new(out)
    }

    /// Intersect every edge with `plane`.
    ///
    /// A convex polygon yields a miss, a touching vertex, or one segment; more
    /// than two distinct crossing points is reported as an error.
    pub fn intersect_plane(&self, plane: &Plane) -> Result<PlaneCrossing, GeomError> {
        if self.points.len() < 3 {
            return Err(GeomError::TooFewVertices {
                found: self.points.len(),
                min: 3,
            });
        }
        let sides: Vec<i8> = self.points.iter().map(|p| plane.which_side(p)).collect();
        if sides.iter().all(|&s| s == 0) {
            return Ok(PlaneCrossing::Coplanar);
        }
        let n = self.points.len();
        let mut hits: Vec<Point3<f64>> = Vec::new();
        let mut push = |p: Point3<f64>| {
            if !hits.iter().any(|q| (q - p).norm_squared() <= DIST2_EPS) {
                hits.push(p);
            }
        };
        for i in 0..n {
            let j = (i + 1) % n;
            if sides[i] == 0 {
                push(self.points[i]);
            }
            if sides[i] * sides[j] < 0 {
                if let Some(p) = plane.segment_intersection(&self.points[i], &self.points[j]) {
                    push(p);
                }
            }
        }
        match hits.len() {
            0 => Ok(PlaneCrossing::Miss),
            1 => Ok(PlaneCrossing::Touch(hits[0])),
            2 => Ok(PlaneCrossing::Segment(hits[0], hits[1])),
            k => Err(GeomError::NonConvexCrossing { crossings: k }),
        }
    }

    // ---- ray queries ----

    /// Ray parameter of the hit with `origin + t * dir`, if any.
    ///
    /// Plane intersection followed by a point-in-polygon test in the
    /// polygon's own frame. Hits behind the origin, or within `RAY_T_EPS` of
    /// it (origin on the surface), are not intersections.
    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        let planar = self.planar()?;
        let t = planar.plane.ray_intersection(origin, dir)?;
        if t <= RAY_T_EPS {
            return None;
        }
        let hit = origin + dir * t;
        let q = planar.plane.to_2d(&planar.basis, &hit);
        point_in_ring(&q, &planar.points).then_some(t)
    }

    /// Hit point of the ray, if any.
    pub fn intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<Point3<f64>> {
        self.ray_intersection(origin, dir).map(|t| origin + dir * t)
    }

    // ---- export ----

    /// Drop the z axis (used after projection, where z is a depth value).
    pub fn to_path_2d(&self) -> Vec<Point2<f64>> {
        self.points.iter().map(|p| Point2::new(p.x, p.y)).collect()
    }

    /// Triangulate in the polygon's own plane; triangles keep the winding.
    pub fn triangulate(&self) -> Vec<[Point3<f64>; 3]> {
        let Some(planar) = self.planar() else {
            return Vec::new();
        };
        earcut(&planar.points)
            .into_iter()
            .map(|[a, b, c]| [self.points[a], self.points[b], self.points[c]])
            .collect()
    }
}

fn vertex_average(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Remove consecutive duplicates, including the closing pair.
fn dedup_ring(pts: &mut Vec<Point3<f64>>) {
    pts.dedup_by(|a, b| (*a - *b).norm_squared() <= DIST2_EPS);
    while pts.len() > 1 {
        let (first, last) = (pts[0], pts[pts.len() - 1]);
        if (first - last).norm_squared() <= DIST2_EPS {
            pts.pop();
        } else {
            break;
        }
    }
}
