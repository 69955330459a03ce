//! Percent-visible results and multi-viewpoint blending.

use nalgebra::{Matrix4, Point3};

use super::surface::{FaceSurface, View};
use crate::clip2::Region2;

/// Clamp to `[0, 1]` and snap values within `eps` of either end.
pub fn snap_percent(p: f64, eps: f64) -> f64 {
    if !p.is_finite() {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    if p < eps {
        0.0
    } else if p > 1.0 - eps {
        1.0
    } else {
        p
    }
}

/// Projected regions from the geometric calculator (NDC of `frame`).
///
/// Besides the projected regions of one eye, the result keeps what its eyes
/// see of each target face in that face's plane coordinates. Blending unions
/// those and measures the union again from every eye.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricResult {
    /// Model matrix the regions were projected with.
    pub frame: Matrix4<f64>,
    pub target: Region2,
    pub obstacles: Region2,
    pub visible: Region2,
    /// Area the visible region is measured against.
    pub denominator: f64,
    pub epsilon: f64,
    /// Indexed like the target's faces; `None` for degenerate faces.
    pub(crate) surfaces: Vec<Option<FaceSurface>>,
    pub(crate) views: Vec<View>,
}

impl GeometricResult {
    pub fn percent_visible(&self) -> f64 {
        if self.denominator <= 0.0 {
            return 0.0;
        }
        snap_percent(self.visible.area() / self.denominator, self.epsilon)
    }

    /// Number of eyes folded into this result.
    pub fn eye_count(&self) -> usize {
        self.views.len()
    }

    fn same_target(&self, other: &GeometricResult) -> bool {
        !self.surfaces.is_empty()
            && self.surfaces.len() == other.surfaces.len()
            && self.surfaces.iter().zip(&other.surfaces).all(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => a.frame == b.frame,
                (None, None) => true,
                _ => false,
            })
    }

    /// Union per face, then keep the eye that sees the largest share of it.
    fn union_with(self, other: GeometricResult) -> GeometricResult {
        let surfaces: Vec<Option<FaceSurface>> = self
            .surfaces
            .into_iter()
            .zip(other.surfaces)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(FaceSurface {
                    visible: a.visible.union(&b.visible),
                    frame: a.frame,
                }),
                _ => None,
            })
            .collect();
        let mut views = self.views;
        views.extend(other.views);

        let mut best: Option<(f64, usize, Region2)> = None;
        for (i, v) in views.iter().enumerate() {
            if v.denominator <= 0.0 {
                continue;
            }
            let visible = v.visible(&surfaces);
            let ratio = visible.area() / v.denominator;
            if best.as_ref().map_or(true, |(r, _, _)| ratio > *r) {
                best = Some((ratio, i, visible));
            }
        }
        let epsilon = self.epsilon.max(other.epsilon);
        match best {
            Some((_, i, visible)) => {
                let v = &views[i];
                GeometricResult {
                    frame: v.frame,
                    target: v.target.clone(),
                    obstacles: v.target.difference(&visible),
                    visible,
                    denominator: v.denominator,
                    epsilon,
                    surfaces,
                    views,
                }
            }
            None => GeometricResult {
                frame: self.frame,
                target: self.target,
                obstacles: self.obstacles,
                visible: self.visible,
                denominator: self.denominator,
                epsilon,
                surfaces,
                views,
            },
        }
    }
}

/// One flag per sample point of the target.
#[derive(Clone, Debug, PartialEq)]
pub struct PointsResult {
    pub visible: Vec<bool>,
    pub epsilon: f64,
}

impl PointsResult {
    pub fn percent_visible(&self) -> f64 {
        if self.visible.is_empty() {
            return 0.0;
        }
        let n = self.visible.iter().filter(|v| **v).count();
        snap_percent(n as f64 / self.visible.len() as f64, self.epsilon)
    }
}

/// Target point behind one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelHit {
    pub point: Point3<f64>,
    /// Index into the target's faces.
    pub face: usize,
}

/// Square pixel masks: pixels showing the target, and those also unoccluded.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelsResult {
    pub frame: Matrix4<f64>,
    pub resolution: usize,
    pub target: Vec<bool>,
    pub visible: Vec<bool>,
    /// Row-major like the masks; `None` off the target.
    pub hits: Vec<Option<PixelHit>>,
    pub epsilon: f64,
}

impl PixelsResult {
    pub fn target_pixels(&self) -> usize {
        self.target.iter().filter(|v| **v).count()
    }

    pub fn visible_pixels(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    pub fn percent_visible(&self) -> f64 {
        let t = self.target_pixels();
        if t == 0 {
            return 0.0;
        }
        snap_percent(self.visible_pixels() as f64 / t as f64, self.epsilon)
    }

    /// Pixel showing `p`, if `p` is in front of the camera and on the grid.
    fn pixel_of(&self, p: &Point3<f64>) -> Option<usize> {
        let clip = self.frame * p.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }
        let res = self.resolution as f64;
        let col = ((clip.x / clip.w + 1.0) * 0.5 * res).floor();
        let row = ((clip.y / clip.w + 1.0) * 0.5 * res).floor();
        if !(0.0..res).contains(&col) || !(0.0..res).contains(&row) {
            return None;
        }
        Some(row as usize * self.resolution + col as usize)
    }

    /// Whether this render shows `hit` unoccluded on the same face.
    fn sees(&self, hit: &PixelHit) -> bool {
        self.pixel_of(&hit.point).is_some_and(|k| {
            self.visible.get(k).copied().unwrap_or(false)
                && self.hits.get(k).copied().flatten().is_some_and(|h| h.face == hit.face)
        })
    }

    /// This render's target mask, visible where either render sees the point.
    fn seen_with(&self, other: &PixelsResult) -> PixelsResult {
        let visible = self
            .visible
            .iter()
            .zip(&self.hits)
            .map(|(v, h)| *v || h.as_ref().is_some_and(|h| other.sees(h)))
            .collect();
        PixelsResult {
            visible,
            epsilon: self.epsilon.max(other.epsilon),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PercentVisibleResult {
    FullyVisible,
    NotVisible,
    Geometric(GeometricResult),
    Points(PointsResult),
    Pixels(PixelsResult),
}

fn or_masks(a: &[bool], b: &[bool]) -> Vec<bool> {
    a.iter().zip(b).map(|(x, y)| *x || *y).collect()
}

impl PercentVisibleResult {
    pub fn percent_visible(&self) -> f64 {
        match self {
            PercentVisibleResult::FullyVisible => 1.0,
            PercentVisibleResult::NotVisible => 0.0,
            PercentVisibleResult::Geometric(g) => g.percent_visible(),
            PercentVisibleResult::Points(p) => p.percent_visible(),
            PercentVisibleResult::Pixels(p) => p.percent_visible(),
        }
    }

    pub fn is_fully_visible(&self) -> bool {
        self.percent_visible() >= 1.0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PercentVisibleResult::FullyVisible => "fully-visible",
            PercentVisibleResult::NotVisible => "not-visible",
            PercentVisibleResult::Geometric(_) => "geometric",
            PercentVisibleResult::Points(_) => "points",
            PercentVisibleResult::Pixels(_) => "pixels",
        }
    }

    /// Combine two evaluations of the same target, keeping whatever either
    /// one sees: a target point visible from either eye counts as visible.
    ///
    /// - Geometric: per-face visible regions are unioned in plane coordinates
    ///   and measured again from every eye; the best measure is kept.
    /// - Pixels: each render's target pixels are checked against the other
    ///   render; the better of the two reference masks is kept.
    /// - Points: masks are ORed when the sample counts match.
    ///
    /// Mismatched kinds or targets keep the larger percentage.
    pub fn blend_maximize(self, other: PercentVisibleResult) -> PercentVisibleResult {
        use PercentVisibleResult::*;
        match (self, other) {
            (FullyVisible, _) | (_, FullyVisible) => FullyVisible,
            (NotVisible, o) | (o, NotVisible) => o,
            (Geometric(a), Geometric(b)) if a.same_target(&b) => Geometric(a.union_with(b)),
            (Points(a), Points(b)) if a.visible.len() == b.visible.len() => Points(PointsResult {
                visible: or_masks(&a.visible, &b.visible),
                epsilon: a.epsilon.max(b.epsilon),
            }),
            (Pixels(a), Pixels(b)) if a.resolution == b.resolution => {
                let from_a = a.seen_with(&b);
                let from_b = b.seen_with(&a);
                if from_b.percent_visible() > from_a.percent_visible() {
                    Pixels(from_b)
                } else {
                    Pixels(from_a)
                }
            }
            (a, b) => {
                if b.percent_visible() > a.percent_visible() {
                    b
                } else {
                    a
                }
            }
        }
    }
}
