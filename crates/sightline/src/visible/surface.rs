//! Target faces in their own plane coordinates.
//!
//! Results measured from different eyes share no camera frame, but every
//! target face has one of its own: its plane. Visible regions are carried
//! from NDC back onto that plane and unioned there. A perspective map sends
//! lines to lines, so mapping the vertices of each convex piece is exact.
//!
//! Plane coordinates are centered on the face and scaled to `[-1, 1]` so they
//! fit the integer window of `clip2`.

use nalgebra::{Matrix4, Point2, Point3, Vector3};

use super::project::Projector;
use crate::clip2::Region2;
use crate::geom3::{Face3, Plane, Polygon3d};

/// In-plane coordinate frame of one target face.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FaceFrame {
    plane: Plane,
    basis: (Vector3<f64>, Vector3<f64>),
    center: Point2<f64>,
    scale: f64,
}

impl FaceFrame {
    pub(crate) fn new(face: &Face3) -> Option<Self> {
        let plane = face.plane()?;
        let basis = plane.basis();
        let (mut min, mut max) = (Point2::new(f64::INFINITY, f64::INFINITY), Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY));
        for p in face.points() {
            let q = plane.to_2d(&basis, p);
            min = min.inf(&q);
            max = max.sup(&q);
        }
        let scale = 0.5 * (max.x - min.x).max(max.y - min.y);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        Some(Self {
            plane,
            basis,
            center: nalgebra::center(&min, &max),
            scale,
        })
    }

    fn to_local(&self, p: &Point3<f64>) -> Point2<f64> {
        let q = self.plane.to_2d(&self.basis, p);
        Point2::from((q - self.center) / self.scale)
    }

    fn to_world(&self, q: &Point2<f64>) -> Point3<f64> {
        self.plane.from_2d(&self.basis, &(self.center + q.coords * self.scale))
    }

    /// NDC region of a camera with inverse model matrix `inv`, as seen on
    /// this face's plane.
    pub(crate) fn unproject(&self, inv: &Matrix4<f64>, region: &Region2) -> Region2 {
        let mut out = Region2::empty();
        for path in region.to_paths() {
            let local: Option<Vec<Point2<f64>>> = path
                .iter()
                .map(|q| {
                    let near = inv.transform_point(&Point3::new(q.x, q.y, -1.0));
                    let far = inv.transform_point(&Point3::new(q.x, q.y, 1.0));
                    let dir = far - near;
                    let t = self.plane.ray_intersection(&near, &dir)?;
                    Some(self.to_local(&(near + dir * t)))
                })
                .collect();
            if let Some(local) = local {
                out = out.union(&Region2::from_path(&local));
            }
        }
        out
    }

    /// Plane region projected through `pr` into its NDC.
    pub(crate) fn project(&self, pr: &Projector, region: &Region2) -> Region2 {
        let mut out = Region2::empty();
        for path in region.to_paths() {
            let world = Polygon3d::new(path.iter().map(|q| self.to_world(q)).collect());
            if let Some(ndc) = pr.path(&world) {
                out = out.union(&Region2::from_path(&ndc));
            }
        }
        out
    }
}

/// What the eyes of a result see of one target face, in plane coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FaceSurface {
    pub(crate) frame: FaceFrame,
    pub(crate) visible: Region2,
}

/// One eye's camera and its measure of the target.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct View {
    pub(crate) projector: Projector,
    pub(crate) frame: Matrix4<f64>,
    pub(crate) target: Region2,
    pub(crate) denominator: f64,
    /// Target faces turned toward this eye, by face index.
    pub(crate) facing: Vec<bool>,
}

impl View {
    /// Union of the face regions this eye can see, in its NDC.
    pub(crate) fn visible(&self, surfaces: &[Option<FaceSurface>]) -> Region2 {
        let mut out = Region2::empty();
        for (s, facing) in surfaces.iter().zip(&self.facing) {
            let Some(s) = s else { continue };
            if !*facing || s.visible.is_empty() {
                continue;
            }
            out = out.union(&s.frame.project(&self.projector, &s.visible));
        }
        out.intersection(&self.target)
    }
}
