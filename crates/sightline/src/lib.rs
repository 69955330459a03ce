//! Line-of-sight and percent-visible computations for 3D scenes.
//!
//! A viewer looks at a target token; walls, tiles, tokens and regions may
//! stand in between. The crate answers two questions:
//! - is the segment between two points blocked (`occlusion`),
//! - what fraction of the target can be seen (`visible`).
//!
//! Layout
//! - `geom3`: planar polygons in 3D, triangles, quads, planes.
//! - `clip2`: integer boolean geometry on projected (NDC) regions.
//! - `camera`: look-at and projection matrices fitted to a target.
//! - `culling`: vision triangle and frustum used to pre-filter obstacles.
//! - `scene`: obstacle data and the spatial-index interface.
//! - `config`: per-evaluation configuration with serde defaults.
//!
//! API Policy
//! - Evaluations are synchronous and evaluation-local; nothing is cached
//!   across calls and the scene is never mutated.

mod cfg;

pub mod api;
pub mod camera;
pub mod clip2;
pub mod config;
pub mod culling;
pub mod geom3;
pub mod occlusion;
pub mod scene;
pub mod visible;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::config::{Algorithm, CalculatorConfig, Sense};
    pub use crate::geom3::{Face3, Polygon3d, Polygons3d};
    pub use crate::occlusion::ObstacleOcclusionTest;
    pub use crate::scene::{Region, Scene, SpatialIndex, Tile, Token, Wall};
    pub use crate::visible::{calculate, calculate_from_viewpoints, PercentVisibleResult, Query};
    pub use nalgebra::{Point2, Point3, Vector3};
}
