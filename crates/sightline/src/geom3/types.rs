//! Axis-aligned boxes (3D) and rectangles (2D, plan view).
//!
//! - `Aabb3`: closed box `[min, max]`; empty when any `min > max`.
//! - `Rect2`: plan-view rectangle used for spatial-index queries.

use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Closed axis-aligned box in 3D.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb3 {
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// The empty box; `grow` on it yields the point itself.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Point3<f64>>>(points: I) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.grow(p);
        }
        b
    }

    #[inline]
    pub fn grow(&mut self, p: &Point3<f64>) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        let mut out = *self;
        out.grow(&other.min);
        out.grow(&other.max);
        out
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// All six bounds are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn half_extents(&self) -> Vector3<f64> {
        self.extents() * 0.5
    }

    /// The 8 corners; bit 0 selects x, bit 1 y, bit 2 z (0 = min, 1 = max).
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let mut out = [Point3::origin(); 8];
        for (k, c) in out.iter_mut().enumerate() {
            c.x = if k & 1 == 0 { self.min.x } else { self.max.x };
            c.y = if k & 2 == 0 { self.min.y } else { self.max.y };
            c.z = if k & 4 == 0 { self.min.z } else { self.max.z };
        }
        out
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    pub fn overlaps(&self, other: &Aabb3) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Plan-view footprint.
    pub fn to_rect(&self) -> Rect2 {
        Rect2 {
            min: Point2::new(self.min.x, self.min.y),
            max: Point2::new(self.max.x, self.max.y),
        }
    }
}

/// Closed plan-view rectangle `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Rect2 {
    #[inline]
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Point2<f64>>>(points: I) -> Self {
        let mut r = Rect2 {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        };
        for p in points {
            r.min.x = r.min.x.min(p.x);
            r.min.y = r.min.y.min(p.y);
            r.max.x = r.max.x.max(p.x);
            r.max.y = r.max.y.max(p.y);
        }
        r
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn overlaps(&self, other: &Rect2) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grow by `pad` on every side.
    pub fn padded(&self, pad: f64) -> Rect2 {
        Rect2 {
            min: Point2::new(self.min.x - pad, self.min.y - pad),
            max: Point2::new(self.max.x + pad, self.max.y + pad),
        }
    }
}

/// Signed volume (×6) of the tetrahedron `(a, b, c, p)`.
///
/// Positive when `p` lies on the side that `a → b → c` winds counter-clockwise
/// around, i.e. the side of the right-hand normal `(b - a) × (c - a)`.
#[inline]
pub fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, p: &Point3<f64>) -> f64 {
    (b - a).cross(&(c - a)).dot(&(p - a))
}

/// Signed area (×2) of the triangle `(a, b, c)` in the plane; positive for CCW.
#[inline]
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
