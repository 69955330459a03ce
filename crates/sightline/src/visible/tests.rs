use nalgebra::{point, Point3};

use super::*;
use crate::config::{PointLayout, ViewpointsConfig};
use crate::scene::{Scene, Token, Wall};

const EYE: Point3<f64> = Point3::new(0.0, 0.0, 50.0);

fn target(size: f64) -> Token {
    Token::square(2, point![1000.0, 0.0], size, 0.0, 100.0)
}

fn cfg(algorithm: Algorithm) -> CalculatorConfig {
    CalculatorConfig {
        algorithm,
        ..CalculatorConfig::default()
    }
}

fn walls(ws: Vec<Wall>) -> Scene {
    Scene {
        walls: ws,
        ..Scene::default()
    }
}

const ALL: [Algorithm; 3] = [Algorithm::Geometric, Algorithm::Points, Algorithm::PerPixel];

#[test]
fn unobstructed_target_is_fully_visible() {
    let t = target(100.0);
    let scene = walls(vec![Wall::new(point![500.0, 3000.0], point![600.0, 3000.0])]);
    for a in ALL {
        let r = calculate(&scene, &Query::new(None, &t, EYE), &cfg(a));
        assert_eq!(r, PercentVisibleResult::FullyVisible, "{a:?}");
    }
}

#[test]
fn full_wall_hides_the_target() {
    let t = target(100.0);
    let scene = walls(vec![Wall::new(point![500.0, -1000.0], point![500.0, 1000.0])]);
    for a in ALL {
        let r = calculate(&scene, &Query::new(None, &t, EYE), &cfg(a));
        assert_eq!(r.percent_visible(), 0.0, "{a:?}");
        assert_ne!(r, PercentVisibleResult::NotVisible, "{a:?} should run the full pipeline");
    }
}

#[test]
fn half_wall_hides_half() {
    let t = target(100.0);
    let scene = walls(vec![Wall::new(point![500.0, 0.0], point![500.0, -1000.0])]);
    let geo = calculate(&scene, &Query::new(None, &t, EYE), &cfg(Algorithm::Geometric));
    assert!((geo.percent_visible() - 0.5).abs() < 0.01, "{}", geo.percent_visible());
    let PercentVisibleResult::Geometric(g) = &geo else {
        panic!("expected a geometric result, got {}", geo.kind());
    };
    assert!((g.obstacles.area() / g.target.area() - 0.5).abs() < 0.01);

    let px = calculate(&scene, &Query::new(None, &t, EYE), &cfg(Algorithm::PerPixel));
    assert!((px.percent_visible() - 0.5).abs() < 0.05, "{}", px.percent_visible());
}

#[test]
fn points_count_unblocked_samples() {
    let t = target(100.0);
    // Sample columns sit at y = -37.5, 0, 37.5; only the first is behind the wall.
    let scene = walls(vec![Wall::new(point![500.0, -10.0], point![500.0, -1000.0])]);
    let mut c = cfg(Algorithm::Points);
    c.points.layout = PointLayout::Five;
    let r = calculate(&scene, &Query::new(None, &t, EYE), &c);
    assert!((r.percent_visible() - 0.6).abs() < 1e-12);
}

#[test]
fn obstacles_behind_the_target_do_not_count() {
    let t = target(100.0);
    let scene = walls(vec![Wall::new(point![1100.0, -1000.0], point![1100.0, 1000.0])]);
    let r = calculate(&scene, &Query::new(None, &t, EYE), &cfg(Algorithm::Geometric));
    assert_eq!(r.percent_visible(), 1.0);
}

#[test]
fn large_targets_normalize_by_one_grid_cube() {
    let t = target(400.0);
    let scene = walls(vec![Wall::new(point![500.0, 0.0], point![500.0, -1000.0])]);
    let plain = calculate(&scene, &Query::new(None, &t, EYE), &cfg(Algorithm::Geometric));
    assert!((plain.percent_visible() - 0.5).abs() < 0.01);
    let mut c = cfg(Algorithm::Geometric);
    c.large_target = true;
    let large = calculate(&scene, &Query::new(None, &t, EYE), &c);
    assert_eq!(large.percent_visible(), 1.0);
}

#[test]
fn target_location_moves_the_target() {
    let t = target(100.0);
    let scene = walls(vec![Wall::new(point![500.0, -1000.0], point![500.0, 1000.0])]);
    // Moved in front of the wall.
    let q = Query::new(None, &t, EYE).at_location(point![300.0, 0.0, 50.0]);
    let r = calculate(&scene, &q, &cfg(Algorithm::Geometric));
    assert_eq!(r, PercentVisibleResult::FullyVisible);
}

#[test]
fn point_sized_target_is_not_visible() {
    let mut t = target(0.0);
    t.top = t.bottom;
    let scene = walls(vec![Wall::new(point![500.0, -1000.0], point![500.0, 1000.0])]);
    for a in [Algorithm::Geometric, Algorithm::PerPixel] {
        let r = calculate(&scene, &Query::new(None, &t, EYE), &cfg(a));
        assert_eq!(r, PercentVisibleResult::NotVisible, "{a:?}");
    }
}

#[test]
fn viewpoint_layouts() {
    let viewer = Token::square(1, point![0.0, 0.0], 100.0, 0.0, 80.0);
    let mut vc = ViewpointsConfig {
        layout: ViewpointLayout::Center,
        inset: 0.5,
    };
    assert_eq!(viewpoints_for(&viewer, &vc, 0.5), vec![point![0.0, 0.0, 80.0]]);
    vc.layout = ViewpointLayout::CenterAndCorners;
    let eyes = viewpoints_for(&viewer, &vc, 0.5);
    assert_eq!(eyes.len(), 5);
    assert_eq!(eyes[1], point![-25.0, -25.0, 80.0]);
    let mut prone = viewer.clone();
    prone.prone = true;
    assert_eq!(viewpoints_for(&prone, &vc, 0.5)[0].z, 40.0);
}

#[test]
fn several_eyes_keep_the_best_view() {
    let t = target(100.0);
    let scene = walls(vec![
        Wall::new(point![500.0, -1000.0], point![500.0, 1000.0]).with_elevation(None, Some(60.0))
    ]);
    let low = point![0.0, 0.0, 50.0];
    let high = point![0.0, 0.0, 1000.0];
    let c = cfg(Algorithm::Geometric);
    let p_low = calculate(&scene, &Query::new(None, &t, low), &c).percent_visible();
    let p_high = calculate(&scene, &Query::new(None, &t, high), &c).percent_visible();
    assert!(p_high > p_low);
    let both = calculate_from_viewpoints(&scene, None, &t, &[low, high], None, &c);
    assert!(both.percent_visible() >= p_low.max(p_high) - 1e-4);
}
