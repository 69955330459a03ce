//! Union of planar polygons, some of them holes.
//!
//! Used for shapes with holes (regions, tiles with cut-outs). Outer rings keep
//! their winding; hole rings are stored reversed so that every ring's front
//! side matches the shape's front side when seen from the same viewpoint
//! after re-reversal. Ray tests count net crossings: outer `+1`, hole `-1`.

use nalgebra::{Matrix4, Point3, Vector3};

use super::polygon::Polygon3d;
use super::types::Aabb3;

#[derive(Clone, Debug, PartialEq)]
pub struct Ring3 {
    pub polygon: Polygon3d,
    pub is_hole: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygons3d {
    pub rings: Vec<Ring3>,
}

impl Polygons3d {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outer(outer: Polygon3d) -> Self {
        let mut out = Self::new();
        out.push_outer(outer);
        out
    }

    pub fn push_outer(&mut self, polygon: Polygon3d) {
        self.rings.push(Ring3 {
            polygon,
            is_hole: false,
        });
    }

    /// Add a hole given in the same winding as the outer ring; stored reversed.
    pub fn push_hole(&mut self, polygon: Polygon3d) {
        self.rings.push(Ring3 {
            polygon: polygon.reversed(),
            is_hole: true,
        });
    }

    pub fn outers(&self) -> impl Iterator<Item = &Polygon3d> + '_ {
        self.rings.iter().filter(|r| !r.is_hole).map(|r| &r.polygon)
    }

    /// Holes, re-reversed to the outer winding.
    pub fn holes(&self) -> impl Iterator<Item = Polygon3d> + '_ {
        self.rings
            .iter()
            .filter(|r| r.is_hole)
            .map(|r| r.polygon.reversed())
    }

    pub fn has_holes(&self) -> bool {
        self.rings.iter().any(|r| r.is_hole)
    }

    pub fn bounds(&self) -> Aabb3 {
        self.outers()
            .fold(Aabb3::empty(), |acc, p| acc.union(&p.bounds()))
    }

    pub fn transform(&self, m: &Matrix4<f64>) -> Polygons3d {
        Polygons3d {
            rings: self
                .rings
                .iter()
                .map(|r| Ring3 {
                    polygon: r.polygon.transform(m),
                    is_hole: r.is_hole,
                })
                .collect(),
        }
    }

    /// Net crossing count of the ray against all rings.
    pub fn crossings(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> i32 {
        self.rings
            .iter()
            .filter(|r| r.polygon.ray_intersection(origin, dir).is_some())
            .map(|r| if r.is_hole { -1 } else { 1 })
            .sum()
    }

    /// Nearest `t` among outer rings, provided the hit is not inside a hole.
    ///
    /// Rings of one shape are coplanar, so a positive net count at the outer
    /// hit decides inside-ness.
    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        if self.crossings(origin, dir) <= 0 {
            return None;
        }
        self.outers()
            .filter_map(|p| p.ray_intersection(origin, dir))
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn is_facing(&self, p: &Point3<f64>) -> bool {
        self.outers().next().is_some_and(|o| o.is_facing(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn square(c: f64, h: f64, z: f64) -> Polygon3d {
        Polygon3d::new(vec![
            point![c - h, c - h, z],
            point![c + h, c - h, z],
            point![c + h, c + h, z],
            point![c - h, c + h, z],
        ])
    }

    #[test]
    fn ray_through_hole_is_outside() {
        let mut shape = Polygons3d::from_outer(square(0.0, 10.0, 0.0));
        shape.push_hole(square(0.0, 2.0, 0.0));
        let down = Vector3::new(0.0, 0.0, -1.0);
        assert_eq!(shape.crossings(&point![0.0, 0.0, 5.0], &down), 0);
        assert!(shape.ray_intersection(&point![0.0, 0.0, 5.0], &down).is_none());
        let t = shape.ray_intersection(&point![5.0, 5.0, 5.0], &down).unwrap();
        assert!((t - 5.0).abs() < 1e-12);
    }

    #[test]
    fn holes_round_trip_their_winding() {
        let mut shape = Polygons3d::new();
        let hole = square(0.0, 1.0, 0.0);
        shape.push_hole(hole.clone());
        assert_eq!(shape.holes().next().unwrap(), hole);
        assert!(shape.has_holes());
        assert!(!shape.is_facing(&point![0.0, 0.0, 1.0]));
    }
}
