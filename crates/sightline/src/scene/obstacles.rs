//! Obstacle data (walls, tiles, tokens, regions) and their 3D faces.
//!
//! Every kind exposes the same small capability surface:
//! - `blocks(sense)`: does it restrict this sense at all,
//! - `faces(..)`: world-space faces for projection,
//! - `ray_hit(..)`: nearest hit parameter along a segment.
//!
//! "Left of `a → b`" means `orient2d(a, b, p) > 0`. Missing elevations mean
//! unbounded and are clamped to `±MAX_ELEVATION` when geometry is built.

use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::cfg::MAX_ELEVATION;
use crate::config::Sense;
use crate::geom3::{orient2d, signed_area2, Aabb3, Face3, Polygon3d, Polygons3d, Rect2};

/// How a wall restricts one sense.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Restriction {
    /// Does not restrict.
    None,
    /// Terrain: two or more along a ray are needed to block.
    Limited,
    #[default]
    Normal,
    /// Stops restricting when the source is within `threshold` of the wall.
    Proximity,
    /// Stops restricting when the source is farther than `threshold`.
    Distance,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseRestrictions {
    pub sight: Restriction,
    pub light: Restriction,
    pub sound: Restriction,
}

impl SenseRestrictions {
    #[inline]
    pub fn get(&self, sense: Sense) -> Restriction {
        match sense {
            Sense::Sight => self.sight,
            Sense::Light => self.light,
            Sense::Sound => self.sound,
        }
    }

    pub fn uniform(r: Restriction) -> Self {
        Self {
            sight: r,
            light: r,
            sound: r,
        }
    }
}

/// One-sided walls block only sources on the named side of `a → b`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WallDirection {
    #[default]
    Both,
    Left,
    Right,
}

/// Per-sense on/off switch for tiles and regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseMask {
    pub sight: bool,
    pub light: bool,
    pub sound: bool,
}

impl Default for SenseMask {
    fn default() -> Self {
        Self {
            sight: true,
            light: true,
            sound: false,
        }
    }
}

impl SenseMask {
    #[inline]
    pub fn get(&self, sense: Sense) -> bool {
        match sense {
            Sense::Sight => self.sight,
            Sense::Light => self.light,
            Sense::Sound => self.sound,
        }
    }
}

#[inline]
fn clamp_bottom(z: Option<f64>) -> f64 {
    z.unwrap_or(-MAX_ELEVATION).max(-MAX_ELEVATION)
}

#[inline]
fn clamp_top(z: Option<f64>) -> f64 {
    z.unwrap_or(MAX_ELEVATION).min(MAX_ELEVATION)
}

/// Hit parameter `t` in `(0, 1)` of the segment `origin → origin + dir`.
#[inline]
fn on_segment(t: Option<f64>) -> Option<f64> {
    t.filter(|t| *t < 1.0 - crate::cfg::EPS)
}

// ---------------------------------------------------------------- walls

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    #[serde(default)]
    pub id: u64,
    pub a: Point2<f64>,
    pub b: Point2<f64>,
    #[serde(default)]
    pub bottom: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub restrictions: SenseRestrictions,
    /// Distance used by `Proximity` and `Distance` restrictions.
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub direction: WallDirection,
}

impl Wall {
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            id: 0,
            a,
            b,
            bottom: None,
            top: None,
            restrictions: SenseRestrictions::default(),
            threshold: None,
            direction: WallDirection::Both,
        }
    }

    pub fn with_elevation(mut self, bottom: Option<f64>, top: Option<f64>) -> Self {
        self.bottom = bottom;
        self.top = top;
        self
    }

    pub fn with_restriction(mut self, r: Restriction) -> Self {
        self.restrictions = SenseRestrictions::uniform(r);
        self
    }

    #[inline]
    pub fn restriction(&self, sense: Sense) -> Restriction {
        self.restrictions.get(sense)
    }

    #[inline]
    pub fn blocks(&self, sense: Sense) -> bool {
        self.restriction(sense) != Restriction::None
    }

    #[inline]
    pub fn is_terrain(&self, sense: Sense) -> bool {
        self.restriction(sense) == Restriction::Limited
    }

    #[inline]
    pub fn is_threshold(&self, sense: Sense) -> bool {
        matches!(
            self.restriction(sense),
            Restriction::Proximity | Restriction::Distance
        )
    }

    /// Zero-length walls carry no geometry.
    pub fn has_geometry(&self) -> bool {
        (self.b - self.a).norm_squared() > 0.0 && clamp_top(self.top) > clamp_bottom(self.bottom)
    }

    pub fn bottom_z(&self) -> f64 {
        clamp_bottom(self.bottom)
    }

    pub fn top_z(&self) -> f64 {
        clamp_top(self.top)
    }

    /// Plan-view distance from `p` to the wall segment.
    pub fn distance_to(&self, p: &Point2<f64>) -> f64 {
        let ab = self.b - self.a;
        let len2 = ab.norm_squared();
        if len2 == 0.0 {
            return (p - self.a).norm();
        }
        let t = ((p - self.a).dot(&ab) / len2).clamp(0.0, 1.0);
        (p - (self.a + ab * t)).norm()
    }

    /// `true` if a threshold wall stops restricting for a source at `origin`.
    pub fn threshold_lifted(&self, sense: Sense, origin: &Point3<f64>) -> bool {
        let Some(th) = self.threshold else {
            return false;
        };
        let d = self.distance_to(&Point2::new(origin.x, origin.y));
        match self.restriction(sense) {
            Restriction::Proximity => d <= th,
            Restriction::Distance => d > th,
            _ => false,
        }
    }

    /// One-sided walls only restrict sources on their blocking side.
    pub fn restricts_from(&self, origin: &Point3<f64>) -> bool {
        let side = orient2d(&self.a, &self.b, &Point2::new(origin.x, origin.y));
        match self.direction {
            WallDirection::Both => true,
            WallDirection::Left => side > 0.0,
            WallDirection::Right => side < 0.0,
        }
    }

    /// Vertical quad; the front is the left side of `a → b`.
    pub fn face(&self) -> Face3 {
        Face3::from_points(
            Polygon3d::vertical_quad(self.a, self.b, self.bottom_z(), self.top_z()).into_points(),
        )
    }

    pub fn bounds(&self) -> Aabb3 {
        Aabb3::new(
            Point3::new(self.a.x.min(self.b.x), self.a.y.min(self.b.y), self.bottom_z()),
            Point3::new(self.a.x.max(self.b.x), self.a.y.max(self.b.y), self.top_z()),
        )
    }

    pub fn ray_hit(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        on_segment(self.face().ray_intersection(origin, dir))
    }
}

// ---------------------------------------------------------------- tiles

/// Row-major alpha grid covering a tile's rectangle; row 0 is `min.y`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaMask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,
}

impl AlphaMask {
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.alpha.len() == self.width * self.height
    }

    /// Alpha in `[0, 1]` at texture coordinates `(u, v)` in `[0, 1]²`
    /// (nearest sample). Outside the texture alpha is 0.
    pub fn alpha_at(&self, u: f64, v: f64) -> f64 {
        if !self.is_well_formed() || !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return 0.0;
        }
        let col = ((u * self.width as f64) as usize).min(self.width - 1);
        let row = ((v * self.height as f64) as usize).min(self.height - 1);
        self.alpha[row * self.width + col] as f64 / 255.0
    }

    /// Opaque cells merged into horizontal runs, as `(col0, col1, row)`
    /// half-open in columns.
    pub fn opaque_runs(&self, threshold: f64) -> Vec<(usize, usize, usize)> {
        let mut runs = Vec::new();
        if !self.is_well_formed() {
            return runs;
        }
        for row in 0..self.height {
            let mut start: Option<usize> = None;
            for col in 0..=self.width {
                let opaque = col < self.width
                    && self.alpha[row * self.width + col] as f64 / 255.0 >= threshold;
                match (opaque, start) {
                    (true, None) => start = Some(col),
                    (false, Some(s)) => {
                        runs.push((s, col, row));
                        start = None;
                    }
                    _ => {}
                }
            }
        }
        runs
    }
}

/// Horizontal rectangle at one elevation (roofs, floors, overhangs).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default)]
    pub id: u64,
    pub min: Point2<f64>,
    pub max: Point2<f64>,
    pub elevation: f64,
    #[serde(default)]
    pub blocks: SenseMask,
    #[serde(default)]
    pub alpha: Option<AlphaMask>,
}

impl Tile {
    pub fn new(min: Point2<f64>, max: Point2<f64>, elevation: f64) -> Self {
        Self {
            id: 0,
            min,
            max,
            elevation,
            blocks: SenseMask::default(),
            alpha: None,
        }
    }

    #[inline]
    pub fn blocks(&self, sense: Sense) -> bool {
        self.blocks.get(sense)
    }

    pub fn has_geometry(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y && self.elevation.is_finite()
    }

    pub fn rect(&self) -> Rect2 {
        Rect2::new(self.min, self.max)
    }

    pub fn bounds(&self) -> Aabb3 {
        Aabb3::new(
            Point3::new(self.min.x, self.min.y, self.elevation),
            Point3::new(self.max.x, self.max.y, self.elevation),
        )
    }

    fn quad(&self, min: Point2<f64>, max: Point2<f64>) -> Face3 {
        let z = self.elevation;
        Face3::from_points(vec![
            Point3::new(min.x, min.y, z),
            Point3::new(max.x, min.y, z),
            Point3::new(max.x, max.y, z),
            Point3::new(min.x, max.y, z),
        ])
    }

    /// Faces for projection: the whole rectangle, or only its opaque cells
    /// when an alpha threshold applies.
    pub fn faces(&self, alpha_threshold: Option<f64>) -> Vec<Face3> {
        match (&self.alpha, alpha_threshold) {
            (Some(mask), Some(th)) if mask.is_well_formed() => {
                let cw = (self.max.x - self.min.x) / mask.width as f64;
                let ch = (self.max.y - self.min.y) / mask.height as f64;
                mask.opaque_runs(th)
                    .into_iter()
                    .map(|(c0, c1, row)| {
                        let lo = Point2::new(self.min.x + c0 as f64 * cw, self.min.y + row as f64 * ch);
                        let hi = Point2::new(self.min.x + c1 as f64 * cw, lo.y + ch);
                        self.quad(lo, hi)
                    })
                    .collect()
            }
            _ => vec![self.quad(self.min, self.max)],
        }
    }

    /// Geometric hit; with an alpha threshold the hit must also land on an
    /// opaque texel.
    pub fn ray_hit(
        &self,
        origin: &Point3<f64>,
        dir: &Vector3<f64>,
        alpha_threshold: Option<f64>,
    ) -> Option<f64> {
        let t = on_segment(self.quad(self.min, self.max).ray_intersection(origin, dir))?;
        match (&self.alpha, alpha_threshold) {
            (Some(mask), Some(th)) => {
                let hit = origin + dir * t;
                let u = (hit.x - self.min.x) / (self.max.x - self.min.x);
                let v = (hit.y - self.min.y) / (self.max.y - self.min.y);
                (mask.alpha_at(u, v) >= th).then_some(t)
            }
            _ => Some(t),
        }
    }
}

// ---------------------------------------------------------------- tokens

/// A creature: plan-view border extruded over an elevation range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: u64,
    pub border: Vec<Point2<f64>>,
    pub bottom: f64,
    pub top: f64,
    #[serde(default = "alive_default")]
    pub alive: bool,
    #[serde(default)]
    pub prone: bool,
    /// Id of the mount this token rides.
    #[serde(default)]
    pub rider_of: Option<u64>,
}

fn alive_default() -> bool {
    true
}

impl Token {
    /// Axis-aligned square token of side `size` centered at `center`.
    pub fn square(id: u64, center: Point2<f64>, size: f64, bottom: f64, top: f64) -> Self {
        let h = size * 0.5;
        Self {
            id,
            border: vec![
                Point2::new(center.x - h, center.y - h),
                Point2::new(center.x + h, center.y - h),
                Point2::new(center.x + h, center.y + h),
                Point2::new(center.x - h, center.y + h),
            ],
            bottom,
            top,
            alive: true,
            prone: false,
            rider_of: None,
        }
    }

    pub fn has_geometry(&self) -> bool {
        self.border.len() >= 3 && signed_area2(&self.border) != 0.0 && self.top > self.bottom
    }

    /// Lying down: dead or prone.
    #[inline]
    pub fn is_lying(&self) -> bool {
        !self.alive || self.prone
    }

    /// Top elevation after the prone/dead height reduction.
    pub fn effective_top(&self, prone_mult: f64) -> f64 {
        if self.is_lying() {
            self.bottom + (self.top - self.bottom) * prone_mult
        } else {
            self.top
        }
    }

    /// Mount/rider relation in either direction.
    pub fn is_related(&self, other: &Token) -> bool {
        self.rider_of == Some(other.id) || other.rider_of == Some(self.id)
    }

    /// Border wound counter-clockwise (`signed_area2 > 0`).
    pub fn outline(&self) -> Vec<Point2<f64>> {
        let mut b = self.border.clone();
        if signed_area2(&b) < 0.0 {
            b.reverse();
        }
        b
    }

    pub fn center(&self) -> Point3<f64> {
        self.bounds(1.0).center()
    }

    pub fn bounds(&self, prone_mult: f64) -> Aabb3 {
        let r = Rect2::from_points(&self.border);
        Aabb3::new(
            Point3::new(r.min.x, r.min.y, self.bottom),
            Point3::new(r.max.x, r.max.y, self.effective_top(prone_mult)),
        )
    }

    /// Copy moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Token {
        let mut t = self.clone();
        for p in &mut t.border {
            p.x += offset.x;
            p.y += offset.y;
        }
        t.bottom += offset.z;
        t.top += offset.z;
        t
    }

    /// Closed prism faces with outward fronts: top, bottom, then sides.
    pub fn faces(&self, prone_mult: f64) -> Vec<Face3> {
        prism_faces(&self.outline(), self.bottom, self.effective_top(prone_mult))
    }

    pub fn ray_hit(&self, origin: &Point3<f64>, dir: &Vector3<f64>, prone_mult: f64) -> Option<f64> {
        self.faces(prone_mult)
            .iter()
            .filter_map(|f| on_segment(f.ray_intersection(origin, dir)))
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Outward-facing faces of a prism over a CCW outline.
fn prism_faces(outline: &[Point2<f64>], bottom: f64, top: f64) -> Vec<Face3> {
    let n = outline.len();
    let mut faces = Vec::with_capacity(n + 2);
    faces.push(Face3::from_points(
        Polygon3d::from_xy(outline, top, true).into_points(),
    ));
    faces.push(Face3::from_points(
        Polygon3d::from_xy(outline, bottom, false).into_points(),
    ));
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        // Outward is right of a → b for a CCW outline.
        faces.push(Face3::from_points(
            Polygon3d::vertical_quad(b, a, bottom, top).into_points(),
        ));
    }
    faces
}

// ---------------------------------------------------------------- regions

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub outer: Vec<Point2<f64>>,
    #[serde(default)]
    pub holes: Vec<Vec<Point2<f64>>>,
}

/// A face of a region: a plain face or a holed cap.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionFace {
    Side(Face3),
    Cap(Polygons3d),
}

impl RegionFace {
    pub fn is_facing(&self, p: &Point3<f64>) -> bool {
        match self {
            RegionFace::Side(f) => f.is_facing(p),
            RegionFace::Cap(c) => c.is_facing(p),
        }
    }

    pub fn ray_intersection(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        match self {
            RegionFace::Side(f) => f.ray_intersection(origin, dir),
            RegionFace::Cap(c) => c.ray_intersection(origin, dir),
        }
    }
}

/// Polygonal volume (with holes) over an elevation range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub id: u64,
    pub shapes: Vec<RegionShape>,
    #[serde(default)]
    pub bottom: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub blocks: SenseMask,
}

impl Region {
    #[inline]
    pub fn blocks(&self, sense: Sense) -> bool {
        self.blocks.get(sense)
    }

    pub fn has_geometry(&self) -> bool {
        self.shapes
            .iter()
            .any(|s| s.outer.len() >= 3 && signed_area2(&s.outer) != 0.0)
            && clamp_top(self.top) > clamp_bottom(self.bottom)
    }

    pub fn bottom_z(&self) -> f64 {
        clamp_bottom(self.bottom)
    }

    pub fn top_z(&self) -> f64 {
        clamp_top(self.top)
    }

    pub fn bounds(&self) -> Aabb3 {
        let r = Rect2::from_points(self.shapes.iter().flat_map(|s| s.outer.iter()));
        Aabb3::new(
            Point3::new(r.min.x, r.min.y, self.bottom_z()),
            Point3::new(r.max.x, r.max.y, self.top_z()),
        )
    }

    /// Caps (with holes) and outward sides; hole walls face into the hole.
    pub fn faces(&self) -> Vec<RegionFace> {
        let (bottom, top) = (self.bottom_z(), self.top_z());
        let mut out = Vec::new();
        for shape in &self.shapes {
            if shape.outer.len() < 3 {
                continue;
            }
            let mut outer = shape.outer.clone();
            if signed_area2(&outer) < 0.0 {
                outer.reverse();
            }
            for (z, up) in [(top, true), (bottom, false)] {
                let mut cap = Polygons3d::from_outer(Polygon3d::from_xy(&outer, z, up));
                for h in &shape.holes {
                    cap.push_hole(Polygon3d::from_xy(h, z, up));
                }
                out.push(RegionFace::Cap(cap));
            }
            for f in prism_faces(&outer, bottom, top).into_iter().skip(2) {
                out.push(RegionFace::Side(f));
            }
            for h in &shape.holes {
                let mut ring = h.clone();
                // Clockwise so that "outward" of the ring points into the hole.
                if signed_area2(&ring) > 0.0 {
                    ring.reverse();
                }
                for f in prism_faces(&ring, bottom, top).into_iter().skip(2) {
                    out.push(RegionFace::Side(f));
                }
            }
        }
        out
    }

    pub fn ray_hit(&self, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        self.faces()
            .iter()
            .filter_map(|f| on_segment(f.ray_intersection(origin, dir)))
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    #[test]
    fn wall_face_and_segment_hits() {
        let w = Wall::new(point![5.0, -5.0], point![5.0, 5.0]).with_elevation(Some(0.0), Some(10.0));
        let o = point![0.0, 0.0, 1.0];
        assert!(w.ray_hit(&o, &Vector3::new(10.0, 0.0, 0.0)).is_some());
        // Segment ends before the wall.
        assert!(w.ray_hit(&o, &Vector3::new(4.0, 0.0, 0.0)).is_none());
        // Passes over the top.
        assert!(w.ray_hit(&point![0.0, 0.0, 20.0], &Vector3::new(10.0, 0.0, 0.0)).is_none());
        // Unbounded wall blocks at any height.
        let tall = Wall::new(point![5.0, -5.0], point![5.0, 5.0]);
        assert!(tall
            .ray_hit(&point![0.0, 0.0, 5e5], &Vector3::new(10.0, 0.0, 0.0))
            .is_some());
    }

    #[test]
    fn wall_sides_and_thresholds() {
        let mut w = Wall::new(point![0.0, 0.0], point![10.0, 0.0]);
        w.direction = WallDirection::Left;
        assert!(w.restricts_from(&point![5.0, 3.0, 0.0]));
        assert!(!w.restricts_from(&point![5.0, -3.0, 0.0]));

        w.restrictions = SenseRestrictions::uniform(Restriction::Proximity);
        w.threshold = Some(10.0);
        assert!(w.is_threshold(Sense::Sight));
        assert!(w.threshold_lifted(Sense::Sight, &point![5.0, 5.0, 0.0]));
        assert!(!w.threshold_lifted(Sense::Sight, &point![5.0, 50.0, 0.0]));
        w.restrictions = SenseRestrictions::uniform(Restriction::Distance);
        assert!(!w.threshold_lifted(Sense::Sight, &point![5.0, 5.0, 0.0]));
        assert!(w.threshold_lifted(Sense::Sight, &point![5.0, 50.0, 0.0]));
    }

    #[test]
    fn token_faces_point_outward() {
        let t = Token::square(1, point![0.0, 0.0], 2.0, 0.0, 2.0);
        let faces = t.faces(1.0);
        assert_eq!(faces.len(), 6);
        let inside = point![0.0, 0.0, 1.0];
        for f in &faces {
            assert!(!f.is_facing(&inside));
        }
        // From far away along +x only the +x side and nothing else faces.
        let far = point![100.0, 0.0, 1.0];
        assert_eq!(faces.iter().filter(|f| f.is_facing(&far)).count(), 1);
        let hit = t.ray_hit(&far, &(inside - far), 1.0).unwrap();
        assert!((hit - 0.99).abs() < 1e-12);
    }

    #[test]
    fn prone_tokens_are_shorter() {
        let mut t = Token::square(1, point![0.0, 0.0], 2.0, 0.0, 2.0);
        t.prone = true;
        assert_eq!(t.effective_top(0.5), 1.0);
        let over = point![-10.0, 0.0, 1.5];
        assert!(t.ray_hit(&over, &Vector3::new(20.0, 0.0, 0.0), 0.5).is_none());
        assert!(t.ray_hit(&over, &Vector3::new(20.0, 0.0, 0.0), 1.0).is_some());
    }

    #[test]
    fn alpha_tile_blocks_only_on_opaque_texels() {
        let mut tile = Tile::new(point![0.0, 0.0], point![2.0, 1.0], 10.0);
        tile.alpha = Some(AlphaMask {
            width: 2,
            height: 1,
            alpha: vec![255, 0],
        });
        let down = Vector3::new(0.0, 0.0, -20.0);
        assert!(tile.ray_hit(&point![0.5, 0.5, 20.0], &down, Some(0.5)).is_some());
        assert!(tile.ray_hit(&point![1.5, 0.5, 20.0], &down, Some(0.5)).is_none());
        assert!(tile.ray_hit(&point![1.5, 0.5, 20.0], &down, None).is_some());
        let faces = tile.faces(Some(0.5));
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].points()[1], point![1.0, 0.0, 10.0]);
    }

    #[test]
    fn region_hole_lets_rays_through() {
        let region = Region {
            id: 1,
            shapes: vec![RegionShape {
                outer: vec![
                    point![-10.0, -10.0],
                    point![10.0, -10.0],
                    point![10.0, 10.0],
                    point![-10.0, 10.0],
                ],
                holes: vec![vec![
                    point![-2.0, -2.0],
                    point![2.0, -2.0],
                    point![2.0, 2.0],
                    point![-2.0, 2.0],
                ]],
            }],
            bottom: Some(0.0),
            top: Some(5.0),
            blocks: SenseMask::default(),
        };
        let down = Vector3::new(0.0, 0.0, -20.0);
        assert!(region.ray_hit(&point![0.0, 0.0, 10.0], &down).is_none());
        let t = region.ray_hit(&point![6.0, 0.0, 10.0], &down).unwrap();
        assert!((t - 0.25).abs() < 1e-12);
        // Sideways through the hole's wall.
        assert!(region
            .ray_hit(&point![0.0, 0.0, 2.0], &Vector3::new(20.0, 0.0, 0.0))
            .is_some());
    }
}
