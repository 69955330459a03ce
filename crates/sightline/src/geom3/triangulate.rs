//! Ear-clipping triangulation of simple planar polygons.
//!
//! Input is a single ring (no holes) in either winding; output triangles are
//! index triples into the input, wound like the input ring. Holes are handled
//! one level up by boolean difference, so the ring-only variant is enough.

use nalgebra::Point2;

use super::types::orient2d;

/// Twice the signed area of a ring (positive for CCW).
pub fn signed_area2(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    acc
}

/// `true` if the ring turns the same way at every vertex (collinear allowed).
pub fn is_convex(ring: &[Point2<f64>]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..n {
        let o = orient2d(&ring[i], &ring[(i + 1) % n], &ring[(i + 2) % n]);
        if o == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = o.signum();
        } else if o.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Triangulate a simple ring by ear clipping.
///
/// Degenerate rings (fewer than 3 vertices, zero area) yield no triangles.
/// Self-intersecting rings are not detected; clipping stops once no ear can
/// be found and the triangles produced so far are returned.
pub fn earcut(ring: &[Point2<f64>]) -> Vec<[usize; 3]> {
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }
    let area = signed_area2(ring);
    if area == 0.0 || !area.is_finite() {
        return Vec::new();
    }
    let ccw = area > 0.0;
    // Work in CCW order; map back to the caller's winding at the end.
    let mut idx: Vec<usize> = if ccw {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    };
    let mut out = Vec::with_capacity(n - 2);
    let mut guard = 0usize;
    let mut i = 0usize;
    while idx.len() > 3 {
        let m = idx.len();
        let ia = idx[(i + m - 1) % m];
        let ib = idx[i % m];
        let ic = idx[(i + 1) % m];
        if is_ear(ring, &idx, ia, ib, ic) {
            out.push(oriented(ia, ib, ic, ccw));
            idx.remove(i % m);
            guard = 0;
            if i >= idx.len() {
                i = 0;
            }
            continue;
        }
        i = (i + 1) % m;
        guard += 1;
        if guard > m {
            // No ear left (numerically degenerate or self-intersecting ring).
            break;
        }
    }
    if idx.len() == 3 {
        let (a, b, c) = (idx[0], idx[1], idx[2]);
        if orient2d(&ring[a], &ring[b], &ring[c]) > 0.0 {
            out.push(oriented(a, b, c, ccw));
        }
    }
    out
}

fn oriented(a: usize, b: usize, c: usize, ccw: bool) -> [usize; 3] {
    if ccw {
        [a, b, c]
    } else {
        [c, b, a]
    }
}

fn is_ear(ring: &[Point2<f64>], idx: &[usize], ia: usize, ib: usize, ic: usize) -> bool {
    let (a, b, c) = (ring[ia], ring[ib], ring[ic]);
    if orient2d(&a, &b, &c) <= 0.0 {
        return false;
    }
    idx.iter()
        .filter(|&&k| k != ia && k != ib && k != ic)
        .all(|&k| !point_in_triangle(&ring[k], &a, &b, &c))
}

/// Closed point-in-triangle test for a CCW triangle.
fn point_in_triangle(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    orient2d(a, b, p) >= 0.0 && orient2d(b, c, p) >= 0.0 && orient2d(c, a, p) >= 0.0
}

/// Even-odd point-in-polygon test (boundary behavior unspecified).
pub fn point_in_ring(p: &Point2<f64>, ring: &[Point2<f64>]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
