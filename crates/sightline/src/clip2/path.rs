//! Integer-scaled 2D paths and the half-plane clip they are built on.
//!
//! Float paths (projected NDC coordinates) are first clipped to the square
//! window `[-WINDOW, WINDOW]²`, then scaled by `SCALE` and rounded. All
//! orientation tests on integer paths are exact (`i128`).

use nalgebra::Point2;

/// Fixed-point scale from NDC units to integer units.
pub const SCALE: f64 = 1e6;
/// Half-width of the NDC window kept before rounding.
pub const WINDOW: f64 = 4.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Scale and round an NDC point. Callers clip to the window first.
    #[inline]
    pub fn from_f64(p: &Point2<f64>) -> Self {
        Self {
            x: (p.x * SCALE).round() as i64,
            y: (p.y * SCALE).round() as i64,
        }
    }

    #[inline]
    pub fn to_f64(self) -> Point2<f64> {
        Point2::new(self.x as f64 / SCALE, self.y as f64 / SCALE)
    }
}

pub type IntPath = Vec<IntPoint>;

/// Exact `(a - o) × (b - o)`.
#[inline]
pub fn cross(o: IntPoint, a: IntPoint, b: IntPoint) -> i128 {
    let (ax, ay) = ((a.x - o.x) as i128, (a.y - o.y) as i128);
    let (bx, by) = ((b.x - o.x) as i128, (b.y - o.y) as i128);
    ax * by - ay * bx
}

/// Twice the signed area (positive for CCW).
pub fn area2(path: &[IntPoint]) -> i128 {
    let n = path.len();
    let mut acc: i128 = 0;
    for i in 0..n {
        let a = path[i];
        let b = path[(i + 1) % n];
        acc += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
    }
    acc
}

/// Normalize a (nearly) convex ring: drop duplicates, orient CCW, and remove
/// collinear or reflex vertices until strictly convex.
///
/// Returns `None` when nothing with positive area remains.
pub fn normalize_convex(mut pts: IntPath) -> Option<IntPath> {
    pts.dedup();
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return None;
    }
    let a = area2(&pts);
    if a == 0 {
        return None;
    }
    if a < 0 {
        pts.reverse();
    }
    loop {
        let n = pts.len();
        if n < 3 {
            return None;
        }
        let drop = (0..n).find(|&i| cross(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]) <= 0);
        match drop {
            Some(i) => {
                pts.remove(i);
            }
            None => break,
        }
    }
    (area2(&pts) > 0).then_some(pts)
}

/// Clip a convex ring by the line `a → b`, keeping the left (or right) side.
///
/// Points on the line are kept on both sides; crossings are rounded.
pub fn clip_halfplane(poly: &[IntPoint], a: IntPoint, b: IntPoint, keep_left: bool) -> IntPath {
    let side = |p: IntPoint| {
        let c = cross(a, b, p);
        if keep_left {
            c
        } else {
            -c
        }
    };
    let n = poly.len();
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let p = poly[i];
        let q = poly[(i + 1) % n];
        let (dp, dq) = (side(p), side(q));
        if dp >= 0 {
            out.push(p);
        }
        if (dp > 0 && dq < 0) || (dp < 0 && dq > 0) {
            let t = dp as f64 / (dp - dq) as f64;
            out.push(IntPoint::new(
                (p.x as f64 + (q.x - p.x) as f64 * t).round() as i64,
                (p.y as f64 + (q.y - p.y) as f64 * t).round() as i64,
            ));
        }
    }
    out
}

/// Sutherland–Hodgman clip of a float ring to `[-w, w]²`.
pub fn clip_to_window(poly: &[Point2<f64>], w: f64) -> Vec<Point2<f64>> {
    let mut cur: Vec<Point2<f64>> = poly.to_vec();
    // (axis, sign): keep sign * coord <= w.
    for (axis, sign) in [(0usize, 1.0f64), (0, -1.0), (1, 1.0), (1, -1.0)] {
        if cur.is_empty() {
            break;
        }
        let n = cur.len();
        let mut next = Vec::with_capacity(n + 1);
        for i in 0..n {
            let p = cur[i];
            let q = cur[(i + 1) % n];
            let dp = w - sign * p[axis];
            let dq = w - sign * q[axis];
            if dp >= 0.0 {
                next.push(p);
            }
            if (dp >= 0.0) != (dq >= 0.0) {
                let t = dp / (dp - dq);
                let mut c = p + (q - p) * t;
                c[axis] = sign * w;
                next.push(c);
            }
        }
        cur = next;
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn ip(x: i64, y: i64) -> IntPoint {
        IntPoint::new(x, y)
    }

    #[test]
    fn normalize_orients_and_strips_collinear() {
        let cw = vec![ip(0, 0), ip(0, 10), ip(5, 10), ip(10, 10), ip(10, 0), ip(10, 0)];
        let n = normalize_convex(cw).unwrap();
        assert_eq!(n.len(), 4);
        assert_eq!(area2(&n), 200);
        assert!(normalize_convex(vec![ip(0, 0), ip(1, 1), ip(2, 2)]).is_none());
    }

    #[test]
    fn halfplane_clip_splits_square() {
        let sq = vec![ip(0, 0), ip(10, 0), ip(10, 10), ip(0, 10)];
        let left = clip_halfplane(&sq, ip(5, 0), ip(5, 10), true);
        let right = clip_halfplane(&sq, ip(5, 0), ip(5, 10), false);
        assert_eq!(area2(&left), 100);
        assert_eq!(area2(&right), 100);
    }

    #[test]
    fn window_clip_bounds_far_points() {
        let tri = vec![point![0.0, 0.0], point![1e6, 0.0], point![0.0, 1e6]];
        let c = clip_to_window(&tri, WINDOW);
        assert!(c.iter().all(|p| p.x.abs() <= WINDOW && p.y.abs() <= WINDOW));
        let int: IntPath = c.iter().map(IntPoint::from_f64).collect();
        let a = area2(&normalize_convex(int).unwrap()) as f64 / (2.0 * SCALE * SCALE);
        assert!((a - 16.0).abs() < 1e-9);
    }
}
