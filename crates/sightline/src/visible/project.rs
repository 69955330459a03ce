//! World faces to NDC regions through a fitted camera.

use nalgebra::{Matrix4, Point2};

use crate::camera::Camera;
use crate::clip2::Region2;
use crate::geom3::{Face3, Plane, Polygon3d, Polygons3d};

/// Look-at and projection matrices of one camera, plus its near plane.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projector {
    look: Matrix4<f64>,
    proj: Matrix4<f64>,
    near: f64,
}

impl Projector {
    pub(crate) fn new(camera: &Camera) -> Self {
        Self {
            look: camera.look_at_matrix(),
            proj: camera.projection_matrix(),
            near: camera.near(),
        }
    }

    /// Camera space, near clip, projection; `None` when nothing valid is left.
    pub(crate) fn path(&self, polygon: &Polygon3d) -> Option<Vec<Point2<f64>>> {
        let mut cam = polygon.transform(&self.look).clip_z(-self.near, true);
        if !cam.is_valid() {
            return None;
        }
        Some(cam.transform(&self.proj).to_path_2d())
    }

    fn clipped_path(&self, polygon: Polygon3d, front_of: Option<&Plane>) -> Option<Vec<Point2<f64>>> {
        match front_of {
            Some(plane) => {
                let kept = polygon.clip_plane(plane, true);
                if kept.len() < 3 {
                    return None;
                }
                self.path(&kept)
            }
            None => self.path(&polygon),
        }
    }

    /// Projected face, optionally cut to the front half-space of a plane first.
    pub(crate) fn face(&self, face: &Face3, front_of: Option<&Plane>) -> Region2 {
        self.clipped_path(face.to_polygon(), front_of)
            .map(|p| Region2::from_path(&p))
            .unwrap_or_default()
    }

    /// Projected holed shape: outer rings minus hole rings.
    pub(crate) fn cap(&self, cap: &Polygons3d, front_of: Option<&Plane>) -> Region2 {
        let outers: Vec<Vec<Point2<f64>>> = cap
            .outers()
            .filter_map(|p| self.clipped_path(p.clone(), front_of))
            .collect();
        if outers.is_empty() {
            return Region2::empty();
        }
        let holes: Vec<Vec<Point2<f64>>> = cap
            .holes()
            .filter_map(|p| self.clipped_path(p, front_of))
            .collect();
        let outer = Region2::from_paths(outers.iter().map(|p| p.as_slice()));
        let holes = Region2::from_paths(holes.iter().map(|p| p.as_slice()));
        outer.difference(&holes)
    }
}
