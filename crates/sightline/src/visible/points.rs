//! Visible fraction of a fixed set of sample points on the target.

use nalgebra::Point3;
use tracing::trace_span;

use super::result::{PercentVisibleResult, PointsResult};
use super::Query;
use crate::config::{CalculatorConfig, PointLayout, PointsConfig};
use crate::geom3::Aabb3;
use crate::occlusion::ObstacleOcclusionTest;
use crate::scene::SpatialIndex;

/// Fraction of the height kept clear of the target's top and bottom faces.
const LEVEL_INSET: f64 = 1e-3;

/// Sample points over `bounds`: layout offsets scaled by `inset` of the
/// half-extents, repeated on each elevation level.
pub fn sample_points(bounds: &Aabb3, cfg: &PointsConfig) -> Vec<Point3<f64>> {
    let c = bounds.center();
    let h = bounds.half_extents() * cfg.inset;
    let offsets: &[(f64, f64)] = match cfg.layout {
        PointLayout::Center => &[(0.0, 0.0)],
        PointLayout::Five => &[(0.0, 0.0), (-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)],
        PointLayout::Nine => &[
            (0.0, 0.0),
            (-1.0, -1.0),
            (1.0, -1.0),
            (1.0, 1.0),
            (-1.0, 1.0),
            (0.0, -1.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (-1.0, 0.0),
        ],
    };
    let height = bounds.max.z - bounds.min.z;
    let levels: Vec<f64> = if cfg.levels >= 3 {
        let pad = height * LEVEL_INSET;
        vec![bounds.min.z + pad, c.z, bounds.max.z - pad]
    } else {
        vec![c.z]
    };
    levels
        .iter()
        .flat_map(|z| {
            offsets
                .iter()
                .map(move |(dx, dy)| Point3::new(c.x + dx * h.x, c.y + dy * h.y, *z))
        })
        .collect()
}

pub fn calculate_points(
    scene: &dyn SpatialIndex,
    query: &Query<'_>,
    config: &CalculatorConfig,
) -> PercentVisibleResult {
    let _span = trace_span!("points", target = query.target.id).entered();
    let prone_mult = config.prone_height_multiplier;
    let target = query.placed_target(prone_mult);
    let test = ObstacleOcclusionTest::new(scene, config, query.viewpoint, &target, query.viewer);
    if !test.has_obstacles() {
        return PercentVisibleResult::FullyVisible;
    }
    let samples = sample_points(&target.bounds(prone_mult), &config.points);
    let visible = samples.iter().map(|p| !test.ray_is_occluded(p)).collect();
    PercentVisibleResult::Points(PointsResult {
        visible,
        epsilon: config.visible_epsilon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    #[test]
    fn layouts_and_levels() {
        let b = Aabb3::new(point![0.0, 0.0, 0.0], point![10.0, 10.0, 10.0]);
        let mut cfg = PointsConfig {
            layout: PointLayout::Center,
            inset: 0.5,
            levels: 1,
        };
        assert_eq!(sample_points(&b, &cfg), vec![point![5.0, 5.0, 5.0]]);
        cfg.layout = PointLayout::Five;
        let five = sample_points(&b, &cfg);
        assert_eq!(five.len(), 5);
        assert_eq!(five[1], point![2.5, 2.5, 5.0]);
        cfg.layout = PointLayout::Nine;
        cfg.levels = 3;
        let nine = sample_points(&b, &cfg);
        assert_eq!(nine.len(), 27);
        assert!(nine.iter().all(|p| p.z > 0.0 && p.z < 10.0));
        assert!((nine[0].z - 0.01).abs() < 1e-12);
    }
}
