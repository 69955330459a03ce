//! Percent-visible calculators and their dispatch.
//!
//! - `calculate`: one viewpoint, algorithm chosen by the config.
//! - `calculate_from_viewpoints`: several eyes folded with `blend_maximize`.
//! - `viewpoints_for`: eye positions on a viewer token.

pub mod geometric;
pub mod pixels;
pub mod points;
mod project;
pub mod result;
mod surface;

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use tracing::debug;

pub use geometric::calculate_geometric;
pub use pixels::calculate_pixels;
pub use points::{calculate_points, sample_points};
pub use result::{GeometricResult, PercentVisibleResult, PixelHit, PixelsResult, PointsResult};

use crate::camera::{Camera, PerspectiveParams, Projection};
use crate::config::{Algorithm, CalculatorConfig, ProjectionKind, ViewpointLayout, ViewpointsConfig};
use crate::geom3::Aabb3;
use crate::scene::{SpatialIndex, Token};

/// One viewer → target evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Query<'a> {
    /// Excluded from the obstacles along with its mount/rider.
    pub viewer: Option<&'a Token>,
    pub target: &'a Token,
    pub viewpoint: Point3<f64>,
    /// Evaluate as if the target's bounds were centered here.
    pub target_location: Option<Point3<f64>>,
}

impl<'a> Query<'a> {
    pub fn new(viewer: Option<&'a Token>, target: &'a Token, viewpoint: Point3<f64>) -> Self {
        Self {
            viewer,
            target,
            viewpoint,
            target_location: None,
        }
    }

    pub fn at_location(mut self, location: Point3<f64>) -> Self {
        self.target_location = Some(location);
        self
    }

    /// The target, moved to `target_location` when one is set.
    pub fn placed_target(&self, prone_mult: f64) -> Token {
        match self.target_location {
            Some(loc) => {
                let c = self.target.bounds(prone_mult).center();
                self.target.translated(&(loc - c))
            }
            None => self.target.clone(),
        }
    }
}

/// Camera at `eye` framing `bounds`, or `None` if the fit is degenerate.
pub(crate) fn fit_camera(eye: &Point3<f64>, bounds: &Aabb3, config: &CalculatorConfig) -> Option<Camera> {
    let center = bounds.center();
    let mut camera = match config.projection {
        ProjectionKind::Perspective => Camera::with_projection(
            *eye,
            center,
            Projection::Perspective(PerspectiveParams {
                fov: PI / 2.0,
                aspect: 1.0,
                near: config.near_plane,
                far: 1e5,
            }),
        ),
        ProjectionKind::Orthographic => Camera::orthographic(*eye, center, config.near_plane),
    };
    match camera.fit_frustum_to_bounds(bounds) {
        Ok(()) => Some(camera),
        Err(e) => {
            debug!(error = %e, "camera fit failed");
            None
        }
    }
}

/// Percent of `query.target` visible from `query.viewpoint`.
pub fn calculate(scene: &dyn SpatialIndex, query: &Query<'_>, config: &CalculatorConfig) -> PercentVisibleResult {
    match config.algorithm {
        Algorithm::Geometric => calculate_geometric(scene, query, config),
        Algorithm::Points => calculate_points(scene, query, config),
        Algorithm::PerPixel => calculate_pixels(scene, query, config),
    }
}

/// Evaluate from every viewpoint and keep what any of them sees.
pub fn calculate_from_viewpoints(
    scene: &dyn SpatialIndex,
    viewer: Option<&Token>,
    target: &Token,
    viewpoints: &[Point3<f64>],
    target_location: Option<Point3<f64>>,
    config: &CalculatorConfig,
) -> PercentVisibleResult {
    let mut acc = PercentVisibleResult::NotVisible;
    for vp in viewpoints {
        let query = Query {
            viewer,
            target,
            viewpoint: *vp,
            target_location,
        };
        acc = acc.blend_maximize(calculate(scene, &query, config));
        if acc == PercentVisibleResult::FullyVisible {
            break;
        }
    }
    acc
}

/// Eye positions on `token`, at the top of its (possibly prone) bounds.
///
/// Corner eyes sit on the border vertices pulled toward the center by
/// `inset`.
pub fn viewpoints_for(token: &Token, cfg: &ViewpointsConfig, prone_mult: f64) -> Vec<Point3<f64>> {
    let b = token.bounds(prone_mult);
    let c = b.center();
    let eye = Point3::new(c.x, c.y, b.max.z);
    let corners = || {
        token.border.iter().map(move |p| {
            let off = Vector3::new(p.x - c.x, p.y - c.y, 0.0) * cfg.inset;
            eye + off
        })
    };
    match cfg.layout {
        ViewpointLayout::Center => vec![eye],
        ViewpointLayout::Corners => corners().collect(),
        ViewpointLayout::CenterAndCorners => std::iter::once(eye).chain(corners()).collect(),
    }
}

#[cfg(test)]
mod tests;
