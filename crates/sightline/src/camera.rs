//! Camera with lazily derived look-at and projection matrices.
//!
//! Conventions
//! - nalgebra column-vector matrices; a world point projects as
//!   `projection * look_at * p` with the homogeneous divide.
//! - Camera space looks down `-z`; the near clip plane is `z = -near`.
//! - The projection carries a mirror `diag(1, -1, 1, 1)` so NDC `y` follows
//!   the scene's y-down plan view.
//!
//! Caches
//! - Every matrix is computed at most once per state; every setter clears all
//!   of them. `Cell` keeps the camera evaluation-local (`!Sync`).

use std::cell::Cell;
use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::cfg::EPS;
use crate::geom3::Aabb3;

/// Widest perspective field of view used when the camera sits inside the
/// bounding sphere of what it frames. Stands in for π, where the projection
/// needs tan(π/2) and is infinite.
pub const MAX_FOV: f64 = 170.0 * PI / 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveParams {
    /// Vertical field of view in radians.
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrthographicParams {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Perspective(PerspectiveParams),
    Orthographic(OrthographicParams),
}

impl Projection {
    pub fn near(&self) -> f64 {
        match self {
            Projection::Perspective(p) => p.near,
            Projection::Orthographic(o) => o.near,
        }
    }

    pub fn far(&self) -> f64 {
        match self {
            Projection::Perspective(p) => p.far,
            Projection::Orthographic(o) => o.far,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, Projection::Perspective(_))
    }
}

/// Bounds that cannot be framed.
#[derive(Clone, Debug, PartialEq)]
pub enum CameraError {
    /// Empty box or NaN/infinite coordinates.
    NonFiniteBounds,
    /// All extents (near) zero.
    DegenerateBounds,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NonFiniteBounds => write!(f, "bounds are empty or not finite"),
            CameraError::DegenerateBounds => write!(f, "bounds have no extent"),
        }
    }
}

impl std::error::Error for CameraError {}

#[derive(Clone, Debug)]
pub struct Camera {
    position: Point3<f64>,
    target: Point3<f64>,
    up: Vector3<f64>,
    projection: Projection,
    look_at: Cell<Option<Matrix4<f64>>>,
    projection_m: Cell<Option<Matrix4<f64>>>,
    model: Cell<Option<Matrix4<f64>>>,
    inverse_model: Cell<Option<Option<Matrix4<f64>>>>,
}

impl Camera {
    /// Perspective camera with `z` up.
    pub fn new(position: Point3<f64>, target: Point3<f64>) -> Self {
        Self::with_projection(
            position,
            target,
            Projection::Perspective(PerspectiveParams {
                fov: PI / 2.0,
                aspect: 1.0,
                near: 0.1,
                far: 1e5,
            }),
        )
    }

    pub fn with_projection(position: Point3<f64>, target: Point3<f64>, projection: Projection) -> Self {
        Self {
            position,
            target,
            up: Vector3::z(),
            projection,
            look_at: Cell::new(None),
            projection_m: Cell::new(None),
            model: Cell::new(None),
            inverse_model: Cell::new(None),
        }
    }

    /// Orthographic camera; clip planes are set by `fit_frustum_to_bounds`.
    pub fn orthographic(position: Point3<f64>, target: Point3<f64>, near: f64) -> Self {
        Self::with_projection(
            position,
            target,
            Projection::Orthographic(OrthographicParams {
                left: -1.0,
                right: 1.0,
                bottom: -1.0,
                top: 1.0,
                near,
                far: 1e5,
            }),
        )
    }

    fn invalidate(&self) {
        self.look_at.set(None);
        self.projection_m.set(None);
        self.model.set(None);
        self.inverse_model.set(None);
    }

    #[inline]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn set_position(&mut self, p: Point3<f64>) {
        self.position = p;
        self.invalidate();
    }

    #[inline]
    pub fn target(&self) -> Point3<f64> {
        self.target
    }

    pub fn set_target(&mut self, p: Point3<f64>) {
        self.target = p;
        self.invalidate();
    }

    #[inline]
    pub fn up(&self) -> Vector3<f64> {
        self.up
    }

    pub fn set_up(&mut self, up: Vector3<f64>) {
        self.up = up;
        self.invalidate();
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.invalidate();
    }

    #[inline]
    pub fn near(&self) -> f64 {
        self.projection.near()
    }

    /// Unit view direction, with fallbacks for degenerate setups.
    ///
    /// An eye at its own target looks straight down.
    pub fn forward(&self) -> Vector3<f64> {
        let d = self.target - self.position;
        let n = d.norm();
        if n <= EPS || !n.is_finite() {
            -Vector3::z()
        } else {
            d / n
        }
    }

    /// World to camera space.
    pub fn look_at_matrix(&self) -> Matrix4<f64> {
        if let Some(m) = self.look_at.get() {
            return m;
        }
        let fwd = self.forward();
        let mut up = self.up;
        if up.cross(&fwd).norm_squared() <= EPS {
            // Looking along the up axis (top-down view).
            up = if fwd.y.abs() < 0.9 {
                Vector3::y()
            } else {
                Vector3::x()
            };
        }
        let m = Matrix4::look_at_rh(&self.position, &(self.position + fwd), &up);
        self.look_at.set(Some(m));
        m
    }

    /// Camera to clip space, mirror included.
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        if let Some(m) = self.projection_m.get() {
            return m;
        }
        let raw = match self.projection {
            Projection::Perspective(p) => Matrix4::new_perspective(p.aspect, p.fov, p.near, p.far),
            Projection::Orthographic(o) => {
                Matrix4::new_orthographic(o.left, o.right, o.bottom, o.top, o.near, o.far)
            }
        };
        let m = mirror() * raw;
        self.projection_m.set(Some(m));
        m
    }

    /// `projection * look_at`.
    pub fn model_matrix(&self) -> Matrix4<f64> {
        if let Some(m) = self.model.get() {
            return m;
        }
        let m = self.projection_matrix() * self.look_at_matrix();
        self.model.set(Some(m));
        m
    }

    /// Inverse of `model_matrix` (NDC back to world), if invertible.
    pub fn inverse_model_matrix(&self) -> Option<Matrix4<f64>> {
        if let Some(m) = self.inverse_model.get() {
            return m;
        }
        let inv = self.model_matrix().try_inverse();
        self.inverse_model.set(Some(inv));
        inv
    }

    #[inline]
    pub fn to_camera_space(&self, p: &Point3<f64>) -> Point3<f64> {
        self.look_at_matrix().transform_point(p)
    }

    /// World point to NDC. Points behind the camera are not meaningful.
    #[inline]
    pub fn project_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.model_matrix().transform_point(p)
    }

    /// Aim at the center of `bounds` and size the projection so the whole
    /// box is inside the frustum.
    ///
    /// Perspective: field of view from the bounding sphere (`MAX_FOV` when the
    /// camera is inside it), far plane at `d + r`. Orthographic: clip planes
    /// from the camera-space extent of the 8 corners, near plane unchanged.
    pub fn fit_frustum_to_bounds(&mut self, bounds: &Aabb3) -> Result<(), CameraError> {
        if bounds.is_empty() || !bounds.is_finite() {
            return Err(CameraError::NonFiniteBounds);
        }
        let r = bounds.half_extents().norm();
        if r <= EPS {
            return Err(CameraError::DegenerateBounds);
        }
        let center = bounds.center();
        self.target = center;
        self.invalidate();
        match self.projection {
            Projection::Perspective(p) => {
                let d = (self.position - center).norm();
                let fov = if d <= r {
                    MAX_FOV
                } else {
                    (2.0 * (r / d).asin()).min(MAX_FOV)
                };
                let far = (d + r).max(p.near * 2.0);
                self.projection = Projection::Perspective(PerspectiveParams { fov, far, ..p });
            }
            Projection::Orthographic(o) => {
                let look = self.look_at_matrix();
                let mut min = Vector3::repeat(f64::INFINITY);
                let mut max = Vector3::repeat(f64::NEG_INFINITY);
                for c in bounds.corners() {
                    let q = look.transform_point(&c);
                    min = min.inf(&q.coords);
                    max = max.sup(&q.coords);
                }
                let pad = |lo: f64, hi: f64| {
                    if hi - lo < EPS {
                        (lo - EPS, hi + EPS)
                    } else {
                        (lo, hi)
                    }
                };
                let (left, right) = pad(min.x, max.x);
                let (bottom, top) = pad(min.y, max.y);
                // Camera space looks down -z: depth is -z.
                let far = (-min.z).max(o.near * 2.0);
                self.projection = Projection::Orthographic(OrthographicParams {
                    left,
                    right,
                    bottom,
                    top,
                    near: o.near,
                    far,
                });
            }
        }
        self.invalidate();
        Ok(())
    }
}

#[inline]
fn mirror() -> Matrix4<f64> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, -1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn unit_box_at(c: Point3<f64>) -> Aabb3 {
        Aabb3::new(c - Vector3::repeat(0.5), c + Vector3::repeat(0.5))
    }

    fn in_ndc(p: &Point3<f64>) -> bool {
        p.iter().all(|v| *v >= -1.0 - 1e-9 && *v <= 1.0 + 1e-9)
    }

    #[test]
    fn perspective_fit_contains_the_box() {
        let mut cam = Camera::new(point![0.0, 0.0, 0.0], point![1.0, 0.0, 0.0]);
        let b = unit_box_at(point![10.0, 3.0, 1.0]);
        cam.fit_frustum_to_bounds(&b).unwrap();
        assert_eq!(cam.target(), b.center());
        for c in b.corners() {
            assert!(in_ndc(&cam.project_point(&c)), "corner {c:?}");
        }
        let Projection::Perspective(p) = *cam.projection() else {
            panic!("projection kind changed");
        };
        let d = (b.center() - cam.position()).norm();
        let r = b.half_extents().norm();
        assert!((p.fov - 2.0 * (r / d).asin()).abs() < 1e-12);
        assert!((p.far - (d + r)).abs() < 1e-12);
    }

    #[test]
    fn camera_inside_bounds_uses_widest_fov() {
        let mut cam = Camera::new(point![0.0, 0.0, 0.0], point![1.0, 0.0, 0.0]);
        cam.fit_frustum_to_bounds(&unit_box_at(point![0.1, 0.0, 0.0])).unwrap();
        let Projection::Perspective(p) = *cam.projection() else {
            panic!("projection kind changed");
        };
        assert_eq!(p.fov, MAX_FOV);
    }

    #[test]
    fn orthographic_fit_contains_the_box() {
        let mut cam = Camera::orthographic(point![0.0, -20.0, 5.0], point![0.0, 0.0, 0.0], 0.1);
        let b = Aabb3::new(point![-3.0, -1.0, 0.0], point![2.0, 4.0, 2.0]);
        cam.fit_frustum_to_bounds(&b).unwrap();
        for c in b.corners() {
            assert!(in_ndc(&cam.project_point(&c)), "corner {c:?}");
        }
    }

    #[test]
    fn rejects_bad_bounds() {
        let mut cam = Camera::new(point![0.0, 0.0, 0.0], point![1.0, 0.0, 0.0]);
        assert_eq!(
            cam.fit_frustum_to_bounds(&Aabb3::empty()),
            Err(CameraError::NonFiniteBounds)
        );
        let nan = Aabb3::new(point![f64::NAN, 0.0, 0.0], point![1.0, 1.0, 1.0]);
        assert_eq!(cam.fit_frustum_to_bounds(&nan), Err(CameraError::NonFiniteBounds));
        let p = point![5.0, 5.0, 5.0];
        assert_eq!(
            cam.fit_frustum_to_bounds(&Aabb3::new(p, p)),
            Err(CameraError::DegenerateBounds)
        );
    }

    #[test]
    fn degenerate_look_directions_stay_finite() {
        // Eye at target, and straight-down view with z up.
        for cam in [
            Camera::new(point![1.0, 1.0, 1.0], point![1.0, 1.0, 1.0]),
            Camera::new(point![0.0, 0.0, 10.0], point![0.0, 0.0, 0.0]),
        ] {
            let m = cam.model_matrix();
            assert!(m.iter().all(|v| v.is_finite()));
            assert!(cam.inverse_model_matrix().is_some());
            let q = cam.project_point(&point![0.3, 0.2, -5.0]);
            assert!(q.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn setters_clear_cached_matrices() {
        let mut cam = Camera::new(point![0.0, 0.0, 0.0], point![1.0, 0.0, 0.0]);
        let before = cam.model_matrix();
        cam.set_position(point![0.0, 5.0, 0.0]);
        assert_ne!(cam.model_matrix(), before);
        let p = point![7.0, -2.0, 1.5];
        let back = cam
            .inverse_model_matrix()
            .unwrap()
            .transform_point(&cam.project_point(&p));
        assert!((back - p).norm() < 1e-6);
    }

    #[test]
    fn mirror_flips_screen_y() {
        // Looking along +x with z up: world +z is screen up, so NDC y < 0.
        let cam = Camera::new(point![0.0, 0.0, 0.0], point![10.0, 0.0, 0.0]);
        let q = cam.project_point(&point![10.0, 0.0, 2.0]);
        assert!(q.y < 0.0);
        assert!(q.x.abs() < 1e-12);
    }
}
