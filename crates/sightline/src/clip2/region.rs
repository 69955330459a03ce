//! Regions as sets of pairwise-disjoint convex integer polygons.
//!
//! Model
//! - A `Region2` is a list of strictly convex CCW pieces with disjoint
//!   interiors. Area is the exact sum of the pieces' areas.
//! - `a ∪ b` is `a` plus the pieces of `b ∖ a`, so disjointness holds by
//!   construction. `a ∖ b` splits every piece of `a` along the edge lines of
//!   each piece of `b`. `a ∩ b` is the pairwise convex intersection.
//! - Non-convex input rings are triangulated on entry; holed shapes are
//!   `outer.difference(&holes)`.
//!
//! Rounding of crossing points to the integer grid can leave slivers of at
//! most one unit width; at `SCALE = 1e6` these are far below any tolerance
//! the calculators use.

use nalgebra::Point2;

use super::path::{
    area2, clip_halfplane, clip_to_window, cross, normalize_convex, IntPath, IntPoint, SCALE,
    WINDOW,
};
use crate::geom3::{earcut, is_convex, signed_area2};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Piece {
    pts: IntPath,
    min: IntPoint,
    max: IntPoint,
}

impl Piece {
    fn new(pts: IntPath) -> Option<Self> {
        let pts = normalize_convex(pts)?;
        let mut min = IntPoint::new(i64::MAX, i64::MAX);
        let mut max = IntPoint::new(i64::MIN, i64::MIN);
        for p in &pts {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { pts, min, max })
    }

    /// Bounding boxes overlap with positive area.
    #[inline]
    fn overlaps(&self, other: &Piece) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    fn intersect(&self, other: &Piece) -> Option<Piece> {
        if !self.overlaps(other) {
            return None;
        }
        let mut cur = self.pts.clone();
        let n = other.pts.len();
        for i in 0..n {
            cur = clip_halfplane(&cur, other.pts[i], other.pts[(i + 1) % n], true);
            if cur.len() < 3 {
                return None;
            }
        }
        Piece::new(cur)
    }

    /// Push the pieces of `self ∖ other` to `out`.
    fn subtract_into(&self, other: &Piece, out: &mut Vec<Piece>) {
        if !self.overlaps(other) {
            out.push(self.clone());
            return;
        }
        let mut rem = self.pts.clone();
        let n = other.pts.len();
        let start = out.len();
        for i in 0..n {
            let (a, b) = (other.pts[i], other.pts[(i + 1) % n]);
            let outside = clip_halfplane(&rem, a, b, false);
            if let Some(p) = Piece::new(outside) {
                out.push(p);
            }
            rem = clip_halfplane(&rem, a, b, true);
            if Piece::new(rem.clone()).is_none() {
                // `other` does not reach into what is left: undo the split.
                out.truncate(start);
                out.push(self.clone());
                return;
            }
        }
    }
}

/// A 2D region in NDC, stored as disjoint convex integer pieces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region2 {
    pieces: Vec<Piece>,
}

impl Region2 {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Region enclosed by one simple ring (either winding).
    pub fn from_path(path: &[Point2<f64>]) -> Self {
        let mut out = Region2::empty();
        if path.len() < 3 || !signed_area2(path).is_finite() {
            return out;
        }
        if is_convex(path) {
            out.push_float(path);
            return out;
        }
        for [a, b, c] in earcut(path) {
            out.push_float(&[path[a], path[b], path[c]]);
        }
        out
    }

    /// Union of several rings, each enclosing a region.
    pub fn from_paths<'a, I: IntoIterator<Item = &'a [Point2<f64>]>>(paths: I) -> Self {
        paths
            .into_iter()
            .fold(Region2::empty(), |acc, p| acc.union(&Region2::from_path(p)))
    }

    /// Outer ring minus hole rings.
    pub fn with_holes(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Self {
        let outer = Region2::from_path(outer);
        if holes.is_empty() {
            return outer;
        }
        let holes = Region2::from_paths(holes.iter().map(|h| h.as_slice()));
        outer.difference(&holes)
    }

    /// Axis-aligned rectangle.
    pub fn rect(min: Point2<f64>, max: Point2<f64>) -> Self {
        Region2::from_path(&[
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    /// Add a convex float piece; callers guarantee disjointness.
    fn push_float(&mut self, ring: &[Point2<f64>]) {
        let clipped = clip_to_window(ring, WINDOW);
        if clipped.len() < 3 {
            return;
        }
        let pts: IntPath = clipped.iter().map(IntPoint::from_f64).collect();
        if let Some(p) = Piece::new(pts) {
            self.pieces.push(p);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Area in NDC units².
    pub fn area(&self) -> f64 {
        let a2: i128 = self.pieces.iter().map(|p| area2(&p.pts)).sum();
        a2 as f64 / (2.0 * SCALE * SCALE)
    }

    pub fn union(&self, other: &Region2) -> Region2 {
        if self.is_empty() {
            return other.clone();
        }
        let mut pieces = self.pieces.clone();
        pieces.extend(other.difference(self).pieces);
        Region2 { pieces }
    }

    pub fn intersection(&self, other: &Region2) -> Region2 {
        let mut pieces = Vec::new();
        for a in &self.pieces {
            for b in &other.pieces {
                if let Some(p) = a.intersect(b) {
                    pieces.push(p);
                }
            }
        }
        Region2 { pieces }
    }

    pub fn difference(&self, other: &Region2) -> Region2 {
        let mut cur = self.pieces.clone();
        for b in &other.pieces {
            if cur.is_empty() {
                break;
            }
            let mut next = Vec::with_capacity(cur.len());
            for a in &cur {
                a.subtract_into(b, &mut next);
            }
            cur = next;
        }
        Region2 { pieces: cur }
    }

    /// Union of many regions, folded left to right.
    pub fn union_all<'a, I: IntoIterator<Item = &'a Region2>>(regions: I) -> Region2 {
        regions
            .into_iter()
            .fold(Region2::empty(), |acc, r| acc.union(r))
    }

    /// Area covered by at least two of `regions`: `∪_{i<j} (R_i ∩ R_j)`.
    pub fn overlap_of_pairs(regions: &[Region2]) -> Region2 {
        let mut out = Region2::empty();
        for i in 0..regions.len() {
            for j in i + 1..regions.len() {
                let both = regions[i].intersection(&regions[j]);
                if !both.is_empty() {
                    out = out.union(&both);
                }
            }
        }
        out
    }

    /// Pieces as float rings (CCW), for debugging and export.
    pub fn to_paths(&self) -> Vec<Vec<Point2<f64>>> {
        self.pieces
            .iter()
            .map(|p| p.pts.iter().map(|q| q.to_f64()).collect())
            .collect()
    }

    /// Closed point containment.
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        let q = IntPoint::from_f64(p);
        self.pieces.iter().any(|piece| {
            let n = piece.pts.len();
            (0..n).all(|i| cross(piece.pts[i], piece.pts[(i + 1) % n], q) >= 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn square(cx: f64, cy: f64, h: f64) -> Region2 {
        Region2::rect(point![cx - h, cy - h], point![cx + h, cy + h])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn overlapping_squares() {
        let a = square(0.0, 0.0, 0.5);
        let b = square(0.5, 0.0, 0.5);
        assert!(close(a.area(), 1.0));
        assert!(close(a.intersection(&b).area(), 0.5));
        assert!(close(a.union(&b).area(), 1.5));
        assert!(close(a.difference(&b).area(), 0.5));
        assert!(close(b.difference(&a).area(), 0.5));
    }

    #[test]
    fn hole_is_subtracted() {
        let outer = vec![point![-1.0, -1.0], point![1.0, -1.0], point![1.0, 1.0], point![-1.0, 1.0]];
        let hole = vec![point![-0.5, -0.5], point![0.5, -0.5], point![0.5, 0.5], point![-0.5, 0.5]];
        let r = Region2::with_holes(&outer, &[hole]);
        assert!(close(r.area(), 3.0));
        assert!(!r.contains(&point![0.0, 0.0]));
        assert!(r.contains(&point![0.75, 0.0]));
    }

    #[test]
    fn concave_ring_is_triangulated() {
        // L-shape, area 3.
        let l = vec![
            point![0.0, 0.0],
            point![2.0, 0.0],
            point![2.0, 1.0],
            point![1.0, 1.0],
            point![1.0, 2.0],
            point![0.0, 2.0],
        ];
        let r = Region2::from_path(&l);
        assert!(r.piece_count() >= 2);
        assert!(close(r.area(), 3.0));
        assert!(!r.contains(&point![1.5, 1.5]));
    }

    #[test]
    fn subtracting_everything_leaves_nothing() {
        let a = square(0.0, 0.0, 0.5);
        let big = square(0.0, 0.0, 1.0);
        assert!(a.difference(&big).is_empty());
        assert_eq!(a.difference(&Region2::empty()), a);
        assert!(close(big.difference(&a).area(), 3.0));
    }

    #[test]
    fn pairwise_overlap_counts_double_cover_only() {
        let rs = vec![
            square(0.0, 0.0, 0.5),
            square(0.5, 0.0, 0.5),
            square(3.0, 3.0, 0.5),
        ];
        assert!(close(Region2::overlap_of_pairs(&rs).area(), 0.5));
        assert!(close(Region2::union_all(&rs).area(), 2.5));
    }
}
