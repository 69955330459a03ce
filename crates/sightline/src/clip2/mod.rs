//! Fixed-precision 2D boolean geometry for projected faces.
//!
//! Purpose
//! - Turn projected (NDC) face outlines into integer regions and compute
//!   union, intersection, difference and area robustly.
//!
//! Notes
//! - Coordinates outside `[-WINDOW, WINDOW]` are clipped away before
//!   rounding; targets are fitted to `[-1, 1]` so nothing visible is lost.
//! - Operations are exact on the integer grid apart from rounding of new
//!   crossing points.

mod path;
mod region;

pub use path::{area2, IntPath, IntPoint, SCALE, WINDOW};
pub use region::Region2;
