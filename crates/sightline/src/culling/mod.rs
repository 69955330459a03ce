//! Coarse culling of the obstacle population for one viewer→target pair.
//!
//! - `VisionTriangle`: plan-view triangle from the viewpoint around the target.
//! - `Frustum`: the triangle extruded between the lower and higher of the
//!   viewpoint and target elevations; answers "may this face matter?".
//!
//! Culling only; occlusion is decided in `occlusion`.

mod frustum;
mod triangle;

pub use frustum::{polygon_overlaps_aabb, Frustum};
pub use triangle::{segments_intersect, VisionTriangle};
