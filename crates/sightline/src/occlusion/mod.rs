//! Point-to-point line-of-sight tests against the culled obstacle set.
//!
//! Construction
//! - Builds the frustum from the ray origin to the target token and asks the
//!   spatial index for candidates of every enabled category.
//! - Walls are partitioned into ordinary, terrain (`limited`) and threshold
//!   (`proximity` / `distance`) walls. Threshold walls whose condition is met
//!   for the origin are dropped here, once per evaluation.
//!
//! Queries
//! - `ray_is_occluded(p)` ORs the per-category tests of the enabled, non-empty
//!   categories. Terrain walls block only when the segment crosses two or more
//!   of them.

use nalgebra::{Point2, Point3, Vector3};
use tracing::{debug, trace};

use crate::config::{CalculatorConfig, Sense, TokenBlocking};
use crate::culling::Frustum;
use crate::scene::{Region, SpatialIndex, Tile, Token, Wall};

/// Obstacle category taking part in the composed ray test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Walls,
    TerrainWalls,
    ThresholdWalls,
    Tiles,
    Tokens,
    Regions,
}

/// Does `token` block under the dead/live/prone switches?
pub fn token_blocks(blocking: &TokenBlocking, token: &Token) -> bool {
    if !token.alive {
        blocking.dead
    } else if token.prone {
        blocking.prone
    } else {
        blocking.live
    }
}

pub struct ObstacleOcclusionTest<'s> {
    origin: Point3<f64>,
    sense: Sense,
    alpha_threshold: Option<f64>,
    prone_mult: f64,
    frustum: Frustum,
    walls: Vec<&'s Wall>,
    terrain_walls: Vec<&'s Wall>,
    threshold_walls: Vec<&'s Wall>,
    tiles: Vec<&'s Tile>,
    tokens: Vec<&'s Token>,
    regions: Vec<&'s Region>,
    categories: Vec<Category>,
}

impl<'s> ObstacleOcclusionTest<'s> {
    /// Collect the obstacles between `origin` and `target`.
    ///
    /// `viewer` (if any), `target`, and tokens riding or carrying either are
    /// never obstacles.
    pub fn new(
        scene: &'s dyn SpatialIndex,
        config: &CalculatorConfig,
        origin: Point3<f64>,
        target: &Token,
        viewer: Option<&Token>,
    ) -> Self {
        let sense = config.sense;
        let prone_mult = config.prone_height_multiplier;
        let tb = target.bounds(prone_mult);
        let frustum = Frustum::new(&origin, &target.outline(), tb.min.z, tb.max.z);
        let rect = frustum.rect();
        let fb = frustum.bounds();
        let _span = tracing::trace_span!("occlusion_init", target = target.id).entered();

        let mut walls = Vec::new();
        let mut terrain_walls = Vec::new();
        let mut threshold_walls = Vec::new();
        if config.blocking.walls {
            let keep = |w: &Wall| {
                if !w.blocks(sense) {
                    return false;
                }
                if !w.has_geometry() {
                    debug!(wall = w.id, "wall without geometry skipped");
                    return false;
                }
                w.restricts_from(&origin)
                    && !w.threshold_lifted(sense, &origin)
                    && frustum.contains_face(w.face().points())
            };
            for w in scene.walls(&rect, &keep) {
                if w.is_terrain(sense) {
                    terrain_walls.push(w);
                } else if w.is_threshold(sense) {
                    threshold_walls.push(w);
                } else {
                    walls.push(w);
                }
            }
        }

        let tiles = if config.blocking.tiles {
            let at = config.alpha_threshold;
            scene.tiles(&rect, &|t: &Tile| {
                if !t.blocks(sense) {
                    return false;
                }
                if !t.has_geometry() {
                    debug!(tile = t.id, "tile without geometry skipped");
                    return false;
                }
                t.faces(at).iter().any(|f| frustum.contains_face(f.points()))
            })
        } else {
            Vec::new()
        };

        let excluded = |t: &Token| {
            t.id == target.id
                || t.is_related(target)
                || viewer.is_some_and(|v| t.id == v.id || t.is_related(v))
        };
        let tokens = scene.tokens(&rect, &|t: &Token| {
            if excluded(t) || !token_blocks(&config.blocking.tokens, t) {
                return false;
            }
            if !t.has_geometry() {
                debug!(token = t.id, "token without geometry skipped");
                return false;
            }
            t.bounds(prone_mult).overlaps(&fb) && frustum.triangle.intersects_ring(&t.border)
        });

        let regions = if config.blocking.regions {
            scene.regions(&rect, &|r: &Region| {
                if !r.blocks(sense) {
                    return false;
                }
                if !r.has_geometry() {
                    debug!(region = r.id, "region without geometry skipped");
                    return false;
                }
                r.bounds().overlaps(&fb)
                    && r.shapes.iter().any(|s| frustum.triangle.intersects_ring(&s.outer))
            })
        } else {
            Vec::new()
        };

        let mut categories = Vec::new();
        for (cat, present) in [
            (Category::Walls, !walls.is_empty()),
            (Category::TerrainWalls, terrain_walls.len() >= 2),
            (Category::ThresholdWalls, !threshold_walls.is_empty()),
            (Category::Tiles, !tiles.is_empty()),
            (Category::Tokens, !tokens.is_empty()),
            (Category::Regions, !regions.is_empty()),
        ] {
            if present {
                categories.push(cat);
            }
        }
        trace!(
            walls = walls.len(),
            terrain = terrain_walls.len(),
            threshold = threshold_walls.len(),
            tiles = tiles.len(),
            tokens = tokens.len(),
            regions = regions.len(),
            "obstacles collected"
        );

        Self {
            origin,
            sense,
            alpha_threshold: config.alpha_threshold,
            prone_mult,
            frustum,
            walls,
            terrain_walls,
            threshold_walls,
            tiles,
            tokens,
            regions,
            categories,
        }
    }

    /// Is the segment `origin → p` blocked?
    pub fn ray_is_occluded(&self, p: &Point3<f64>) -> bool {
        let dir = p - self.origin;
        self.categories.iter().any(|c| self.category_blocks(*c, &dir))
    }

    fn category_blocks(&self, cat: Category, dir: &Vector3<f64>) -> bool {
        let o = &self.origin;
        match cat {
            Category::Walls => self.walls.iter().any(|w| w.ray_hit(o, dir).is_some()),
            Category::ThresholdWalls => self.threshold_walls.iter().any(|w| w.ray_hit(o, dir).is_some()),
            Category::TerrainWalls => {
                self.terrain_walls
                    .iter()
                    .filter(|w| w.ray_hit(o, dir).is_some())
                    .take(2)
                    .count()
                    >= 2
            }
            Category::Tiles => self
                .tiles
                .iter()
                .any(|t| t.ray_hit(o, dir, self.alpha_threshold).is_some()),
            Category::Tokens => self
                .tokens
                .iter()
                .any(|t| t.ray_hit(o, dir, self.prone_mult).is_some()),
            Category::Regions => self.regions.iter().any(|r| r.ray_hit(o, dir).is_some()),
        }
    }

    /// Some obstacle survived culling (terrain walls count only in pairs).
    pub fn has_obstacles(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn origin_2d(&self) -> Point2<f64> {
        Point2::new(self.origin.x, self.origin.y)
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn alpha_threshold(&self) -> Option<f64> {
        self.alpha_threshold
    }

    pub fn prone_height_multiplier(&self) -> f64 {
        self.prone_mult
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn walls(&self) -> &[&'s Wall] {
        &self.walls
    }

    pub fn terrain_walls(&self) -> &[&'s Wall] {
        &self.terrain_walls
    }

    pub fn threshold_walls(&self) -> &[&'s Wall] {
        &self.threshold_walls
    }

    pub fn tiles(&self) -> &[&'s Tile] {
        &self.tiles
    }

    pub fn tokens(&self) -> &[&'s Token] {
        &self.tokens
    }

    pub fn regions(&self) -> &[&'s Region] {
        &self.regions
    }
}
