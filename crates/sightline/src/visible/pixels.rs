//! Visible fraction of the target's pixels in a small CPU render.
//!
//! One ray per pixel center is cast through the inverse model matrix of the
//! fitted camera. A pixel belongs to the target when its ray hits a target
//! face; it is visible when the segment from the viewpoint to that hit is
//! unoccluded. The hit point and face are kept per pixel so renders from
//! other eyes can be checked against this one.

use nalgebra::{Matrix4, Point3, Vector3};
use tracing::{debug, trace_span};

use super::result::{PercentVisibleResult, PixelHit, PixelsResult};
use super::{fit_camera, Query};
use crate::config::CalculatorConfig;
use crate::geom3::Face3;
use crate::occlusion::ObstacleOcclusionTest;
use crate::scene::SpatialIndex;

/// World-space ray of pixel `(col, row)`: near-plane point and direction to
/// the far plane.
fn pixel_ray(inv: &Matrix4<f64>, col: usize, row: usize, res: usize) -> (Point3<f64>, Vector3<f64>) {
    let u = -1.0 + (2 * col + 1) as f64 / res as f64;
    let v = -1.0 + (2 * row + 1) as f64 / res as f64;
    let near = inv.transform_point(&Point3::new(u, v, -1.0));
    let far = inv.transform_point(&Point3::new(u, v, 1.0));
    (near, far - near)
}

/// Face index and ray parameter of the closest face along the ray.
fn nearest_hit(faces: &[Face3], origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<(usize, f64)> {
    faces
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.ray_intersection(origin, dir).map(|t| (i, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn calculate_pixels(
    scene: &dyn SpatialIndex,
    query: &Query<'_>,
    config: &CalculatorConfig,
) -> PercentVisibleResult {
    let _span = trace_span!("pixels", target = query.target.id).entered();
    let prone_mult = config.prone_height_multiplier;
    let target = query.placed_target(prone_mult);
    let eye = query.viewpoint;

    let Some(camera) = fit_camera(&eye, &target.bounds(prone_mult), config) else {
        return PercentVisibleResult::NotVisible;
    };
    let Some(inv) = camera.inverse_model_matrix() else {
        debug!(target = target.id, "model matrix not invertible");
        return PercentVisibleResult::NotVisible;
    };
    let test = ObstacleOcclusionTest::new(scene, config, eye, &target, query.viewer);
    if !test.has_obstacles() {
        return PercentVisibleResult::FullyVisible;
    }

    let faces = target.faces(prone_mult);
    let res = config.pixels.resolution.max(1);
    let mut target_mask = vec![false; res * res];
    let mut visible = vec![false; res * res];
    let mut hits = vec![None; res * res];
    for row in 0..res {
        for col in 0..res {
            let (origin, dir) = pixel_ray(&inv, col, row, res);
            let Some((face, t)) = nearest_hit(&faces, &origin, &dir) else {
                continue;
            };
            let k = row * res + col;
            let point = origin + dir * t;
            target_mask[k] = true;
            visible[k] = !test.ray_is_occluded(&point);
            hits[k] = Some(PixelHit { point, face });
        }
    }
    if !target_mask.iter().any(|v| *v) {
        debug!(target = target.id, "target covers no pixel");
        return PercentVisibleResult::NotVisible;
    }
    PercentVisibleResult::Pixels(PixelsResult {
        frame: camera.model_matrix(),
        resolution: res,
        target: target_mask,
        visible,
        hits,
        epsilon: config.visible_epsilon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use nalgebra::point;

    #[test]
    fn center_pixel_ray_passes_through_the_target_center() {
        let cam = Camera::new(point![0.0, 0.0, 0.0], point![10.0, 0.0, 0.0]);
        let inv = cam.inverse_model_matrix().unwrap();
        // Odd resolution: the middle pixel center is NDC (0, 0).
        let (o, d) = pixel_ray(&inv, 1, 1, 3);
        let dir = d.normalize();
        assert!((dir.x - 1.0).abs() < 1e-9);
        assert!(o.y.abs() < 1e-9 && o.z.abs() < 1e-9);
    }
}
