//! Host-scene collaborators: obstacle data, spatial queries, random scenes.

pub mod index;
pub mod obstacles;
pub mod rand;

pub use index::{Scene, SceneError, SpatialIndex};
pub use obstacles::{
    AlphaMask, Region, RegionFace, RegionShape, Restriction, SenseMask, SenseRestrictions, Tile,
    Token, Wall, WallDirection,
};
pub use self::rand::{draw_scene, RandomSceneCfg, ReplayToken, TARGET_ID, VIEWER_ID};
