//! Curated surface for callers outside this crate (the CLI, benches, tests).
//!
//! Prefer these re-exports over reaching into submodules.

// Evaluation
pub use crate::config::{
    Algorithm, BlockingConfig, CalculatorConfig, PixelsConfig, PointLayout, PointsConfig,
    ProjectionKind, Sense, TokenBlocking, ViewpointLayout, ViewpointsConfig,
};
pub use crate::occlusion::{token_blocks, Category, ObstacleOcclusionTest};
pub use crate::visible::{
    calculate, calculate_from_viewpoints, sample_points, viewpoints_for, GeometricResult,
    PercentVisibleResult, PixelHit, PixelsResult, PointsResult, Query,
};
// Scene data
pub use crate::scene::{
    draw_scene, AlphaMask, RandomSceneCfg, Region, RegionShape, ReplayToken, Restriction, Scene,
    SceneError, SenseMask, SenseRestrictions, SpatialIndex, Tile, Token, Wall, WallDirection,
    TARGET_ID, VIEWER_ID,
};
// Geometry
pub use crate::camera::{Camera, CameraError, Projection};
pub use crate::clip2::Region2;
pub use crate::culling::{Frustum, VisionTriangle};
pub use crate::geom3::{Aabb3, Face3, GeomError, Plane, Polygon3d, Polygons3d, Quad3d, Rect2, Triangle3d};
