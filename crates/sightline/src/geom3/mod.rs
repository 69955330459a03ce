//! Planar 3D geometry: boxes, planes, polygons and their fixed-arity forms.
//!
//! Purpose
//! - Represent obstacle and target faces as planar polygons in world space.
//! - Provide the operations the visibility pipeline needs: transform, clip,
//!   ray intersection, plane intersection, facing tests, triangulation.
//!
//! Conventions
//! - World space is right-handed with `z` up (elevation).
//! - A face's front is the side its counter-clockwise winding points to.
//! - Degenerate inputs yield `None`/empty results; only violated
//!   preconditions (too few vertices, non-convex crossings) become `GeomError`.

mod plane;
mod polygon;
mod polygons;
mod shapes;
mod triangulate;
mod types;

pub use plane::Plane;
pub use polygon::{GeomError, PlaneCrossing, Polygon3d};
pub use polygons::{Polygons3d, Ring3};
pub use shapes::{Face3, Quad3d, Triangle3d};
pub use triangulate::{earcut, is_convex, point_in_ring, signed_area2};
pub use types::{orient2d, orient3d, Aabb3, Rect2};
