//! Spatial queries over the obstacle collections.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::obstacles::{Region, Tile, Token, Wall};
use crate::geom3::Rect2;

/// Candidate lookup per obstacle category: everything whose plan-view bounds
/// overlap `rect` and pass `keep`. Implementations never mutate obstacles.
pub trait SpatialIndex {
    fn walls(&self, rect: &Rect2, keep: &dyn Fn(&Wall) -> bool) -> Vec<&Wall>;
    fn tiles(&self, rect: &Rect2, keep: &dyn Fn(&Tile) -> bool) -> Vec<&Tile>;
    fn tokens(&self, rect: &Rect2, keep: &dyn Fn(&Token) -> bool) -> Vec<&Token>;
    fn regions(&self, rect: &Rect2, keep: &dyn Fn(&Region) -> bool) -> Vec<&Region>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneError {
    DuplicateTokenId(u64),
    UnknownMount { rider: u64, mount: u64 },
    NonFinite { kind: &'static str, id: u64 },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::DuplicateTokenId(id) => write!(f, "duplicate token id {id}"),
            SceneError::UnknownMount { rider, mount } => {
                write!(f, "token {rider} rides unknown token {mount}")
            }
            SceneError::NonFinite { kind, id } => write!(f, "{kind} {id} has non-finite coordinates"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Flat obstacle lists with a linear bounds scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub grid_size: Option<f64>,
    pub walls: Vec<Wall>,
    pub tiles: Vec<Tile>,
    pub tokens: Vec<Token>,
    pub regions: Vec<Region>,
}

fn scan<'a, T>(
    items: &'a [T],
    rect: &Rect2,
    bounds: impl Fn(&T) -> Rect2,
    keep: &dyn Fn(&T) -> bool,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|it| bounds(it).overlaps(rect) && keep(it))
        .collect()
}

impl Scene {
    pub fn token(&self, id: u64) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.tiles.is_empty() && self.tokens.is_empty() && self.regions.is_empty()
    }

    /// Check cross-references and coordinates.
    pub fn validate(&self) -> Result<(), SceneError> {
        let mut seen = std::collections::HashSet::new();
        for t in &self.tokens {
            if !seen.insert(t.id) {
                return Err(SceneError::DuplicateTokenId(t.id));
            }
        }
        for t in &self.tokens {
            if let Some(mount) = t.rider_of {
                if !seen.contains(&mount) {
                    return Err(SceneError::UnknownMount { rider: t.id, mount });
                }
            }
            let finite = t.border.iter().all(|p| p.x.is_finite() && p.y.is_finite())
                && t.bottom.is_finite()
                && t.top.is_finite();
            if !finite {
                return Err(SceneError::NonFinite { kind: "token", id: t.id });
            }
        }
        for w in &self.walls {
            if ![w.a.x, w.a.y, w.b.x, w.b.y].iter().all(|v| v.is_finite()) {
                return Err(SceneError::NonFinite { kind: "wall", id: w.id });
            }
        }
        for t in &self.tiles {
            if ![t.min.x, t.min.y, t.max.x, t.max.y].iter().all(|v| v.is_finite()) {
                return Err(SceneError::NonFinite { kind: "tile", id: t.id });
            }
        }
        for r in &self.regions {
            let finite = r
                .shapes
                .iter()
                .flat_map(|s| s.outer.iter().chain(s.holes.iter().flatten()))
                .all(|p| p.x.is_finite() && p.y.is_finite());
            if !finite {
                return Err(SceneError::NonFinite { kind: "region", id: r.id });
            }
        }
        Ok(())
    }
}

impl SpatialIndex for Scene {
    fn walls(&self, rect: &Rect2, keep: &dyn Fn(&Wall) -> bool) -> Vec<&Wall> {
        scan(&self.walls, rect, |w| w.bounds().to_rect(), keep)
    }

    fn tiles(&self, rect: &Rect2, keep: &dyn Fn(&Tile) -> bool) -> Vec<&Tile> {
        scan(&self.tiles, rect, Tile::rect, keep)
    }

    fn tokens(&self, rect: &Rect2, keep: &dyn Fn(&Token) -> bool) -> Vec<&Token> {
        scan(&self.tokens, rect, |t| t.bounds(1.0).to_rect(), keep)
    }

    fn regions(&self, rect: &Rect2, keep: &dyn Fn(&Region) -> bool) -> Vec<&Region> {
        scan(&self.regions, rect, |r| r.bounds().to_rect(), keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    #[test]
    fn queries_filter_by_rect_and_predicate() {
        let scene = Scene {
            walls: vec![
                Wall::new(point![0.0, 0.0], point![10.0, 0.0]),
                Wall::new(point![100.0, 0.0], point![110.0, 0.0]),
            ],
            tokens: vec![
                Token::square(1, point![5.0, 5.0], 2.0, 0.0, 2.0),
                Token::square(2, point![6.0, 5.0], 2.0, 0.0, 2.0),
            ],
            ..Scene::default()
        };
        let rect = Rect2::new(point![-1.0, -1.0], point![20.0, 20.0]);
        assert_eq!(scene.walls(&rect, &|_| true).len(), 1);
        let ids: Vec<u64> = scene.tokens(&rect, &|t| t.id != 1).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);
        assert!(scene.tiles(&rect, &|_| true).is_empty());
    }

    #[test]
    fn validate_catches_bad_references() {
        let mut scene = Scene {
            tokens: vec![Token::square(1, point![0.0, 0.0], 1.0, 0.0, 1.0)],
            ..Scene::default()
        };
        assert_eq!(scene.validate(), Ok(()));
        scene.tokens[0].rider_of = Some(9);
        assert_eq!(
            scene.validate(),
            Err(SceneError::UnknownMount { rider: 1, mount: 9 })
        );
        scene.tokens[0].rider_of = None;
        scene.tokens.push(Token::square(1, point![3.0, 0.0], 1.0, 0.0, 1.0));
        assert_eq!(scene.validate(), Err(SceneError::DuplicateTokenId(1)));
    }

    #[test]
    fn scene_json_uses_defaults() {
        let json = r#"{
            "walls": [{"a": [0.0, 0.0], "b": [1.0, 0.0], "restrictions": {"sight": "limited"}}],
            "tokens": [{"id": 3, "border": [[0,0],[1,0],[1,1]], "bottom": 0.0, "top": 1.0}]
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.walls[0].top, None);
        assert!(scene.walls[0].is_terrain(crate::config::Sense::Sight));
        assert!(!scene.walls[0].is_terrain(crate::config::Sense::Light));
        assert!(scene.tokens[0].alive);
        assert_eq!(scene.grid_size, None);
    }
}
