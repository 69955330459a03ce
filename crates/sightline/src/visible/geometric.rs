//! Visible fraction of the target's projected silhouette.
//!
//! Pipeline per evaluation:
//! camera fit → obstacle collection → projection → boolean area.
//!
//! Each facing target face is handled on its own: obstacle faces are first
//! cut to the viewer's side of that face's plane, so geometry behind the
//! target never occludes it. Terrain walls contribute only where two or more
//! of their projections overlap. What each face shows is also kept in the
//! face's plane coordinates so results from several eyes can be unioned.

use nalgebra::Point2;
use tracing::{debug, trace, trace_span};

use super::project::Projector;
use super::result::{GeometricResult, PercentVisibleResult};
use super::surface::{FaceFrame, FaceSurface, View};
use super::{fit_camera, Query};
use crate::camera::Camera;
use crate::clip2::Region2;
use crate::config::CalculatorConfig;
use crate::geom3::{Face3, Plane, Polygons3d};
use crate::occlusion::ObstacleOcclusionTest;
use crate::scene::{RegionFace, SpatialIndex, Token};

/// Projected target areas below this (NDC units²) count as nothing to see.
const MIN_TARGET_AREA: f64 = 1e-10;

/// Obstacle faces in world space, split by how they combine.
#[derive(Default)]
struct ObstacleFaces {
    solid: Vec<Face3>,
    caps: Vec<Polygons3d>,
    terrain: Vec<Face3>,
}

impl ObstacleFaces {
    fn collect(test: &ObstacleOcclusionTest<'_>) -> Self {
        let eye = test.origin();
        let mut out = ObstacleFaces::default();
        // Walls and tiles are two-sided; one-sided walls were culled by side.
        for w in test.walls().iter().chain(test.threshold_walls()) {
            out.solid.push(w.face());
        }
        for t in test.tiles() {
            out.solid.extend(t.faces(test.alpha_threshold()));
        }
        // Closed solids: only the faces turned toward the viewer.
        for t in test.tokens() {
            out.solid.extend(
                t.faces(test.prone_height_multiplier())
                    .into_iter()
                    .filter(|f| f.is_facing(&eye)),
            );
        }
        for r in test.regions() {
            for f in r.faces() {
                if !f.is_facing(&eye) {
                    continue;
                }
                match f {
                    RegionFace::Side(s) => out.solid.push(s),
                    RegionFace::Cap(c) => out.caps.push(c),
                }
            }
        }
        if test.terrain_walls().len() >= 2 {
            out.terrain = test.terrain_walls().iter().map(|w| w.face()).collect();
        }
        out
    }

    /// Union of everything blocking in front of `front_of`.
    fn project(&self, pr: &Projector, front_of: Option<&Plane>) -> Region2 {
        let mut blocked = Region2::empty();
        for f in &self.solid {
            let r = pr.face(f, front_of);
            if !r.is_empty() {
                blocked = blocked.union(&r);
            }
        }
        for c in &self.caps {
            let r = pr.cap(c, front_of);
            if !r.is_empty() {
                blocked = blocked.union(&r);
            }
        }
        if !self.terrain.is_empty() {
            let layers: Vec<Region2> = self
                .terrain
                .iter()
                .map(|f| pr.face(f, front_of))
                .filter(|r| !r.is_empty())
                .collect();
            blocked = blocked.union(&Region2::overlap_of_pairs(&layers));
        }
        blocked
    }
}

/// Projected area of one grid cube centered on the target.
fn grid_cube_area(pr: &Projector, camera: &Camera, target: &Token, grid: f64, prone_mult: f64) -> f64 {
    let c = target.bounds(prone_mult).center();
    let cube = Token::square(0, Point2::new(c.x, c.y), grid, c.z - grid * 0.5, c.z + grid * 0.5);
    let eye = camera.position();
    let faces = cube.faces(1.0);
    let regions: Vec<Region2> = faces
        .iter()
        .filter(|f| f.is_facing(&eye))
        .map(|f| pr.face(f, None))
        .collect();
    Region2::union_all(&regions).area()
}

pub fn calculate_geometric(
    scene: &dyn SpatialIndex,
    query: &Query<'_>,
    config: &CalculatorConfig,
) -> PercentVisibleResult {
    let _span = trace_span!("geometric", target = query.target.id).entered();
    let prone_mult = config.prone_height_multiplier;
    let target = query.placed_target(prone_mult);
    let eye = query.viewpoint;

    let Some(camera) = fit_camera(&eye, &target.bounds(prone_mult), config) else {
        return PercentVisibleResult::NotVisible;
    };
    trace!("camera fitted");

    let test = ObstacleOcclusionTest::new(scene, config, eye, &target, query.viewer);
    if !test.has_obstacles() {
        return PercentVisibleResult::FullyVisible;
    }
    let obstacles = ObstacleFaces::collect(&test);
    trace!(
        solid = obstacles.solid.len(),
        caps = obstacles.caps.len(),
        terrain = obstacles.terrain.len(),
        "obstacle faces collected"
    );

    let pr = Projector::new(&camera);
    let inverse = camera.inverse_model_matrix();
    let faces = target.faces(prone_mult);
    let mut facing = Vec::with_capacity(faces.len());
    let mut surfaces = Vec::with_capacity(faces.len());
    let mut target_region = Region2::empty();
    let mut blocked = Region2::empty();
    let mut visible = Region2::empty();
    for face in &faces {
        let turned = face.is_facing(&eye);
        facing.push(turned);
        let mut seen = Region2::empty();
        if turned {
            let t = pr.face(face, None);
            if !t.is_empty() {
                let plane = face.plane();
                let b = obstacles.project(&pr, plane.as_ref()).intersection(&t);
                seen = t.difference(&b);
                visible = visible.union(&seen);
                blocked = blocked.union(&b);
                target_region = target_region.union(&t);
            }
        }
        surfaces.push(FaceFrame::new(face).map(|frame| FaceSurface {
            visible: match &inverse {
                Some(inv) if !seen.is_empty() => frame.unproject(inv, &seen),
                _ => Region2::empty(),
            },
            frame,
        }));
    }
    if inverse.is_none() {
        debug!(target = target.id, "model matrix not invertible; result cannot be blended by area");
        surfaces.clear();
    }
    trace!("target and obstacles projected");

    let target_area = target_region.area();
    if target_area <= MIN_TARGET_AREA {
        debug!(target = target.id, area = target_area, "projected target area is zero");
        return PercentVisibleResult::NotVisible;
    }
    let denominator = if config.large_target {
        let cube = grid_cube_area(&pr, &camera, &target, config.grid_size, prone_mult);
        if cube > MIN_TARGET_AREA {
            target_area.min(cube)
        } else {
            target_area
        }
    } else {
        target_area
    };
    trace!(target_area, denominator, "area computed");

    let frame = camera.model_matrix();
    let view = View {
        projector: pr,
        frame,
        target: target_region.clone(),
        denominator,
        facing,
    };
    PercentVisibleResult::Geometric(GeometricResult {
        frame,
        target: target_region,
        obstacles: blocked,
        visible,
        denominator,
        epsilon: config.visible_epsilon,
        surfaces,
        views: vec![view],
    })
}
