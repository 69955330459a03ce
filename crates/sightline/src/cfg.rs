//! Tolerance defaults for geometric predicates (internal).
//!
//! Policy
//! - Fixed constants, no per-call tolerance juggling. World coordinates are
//!   scene units (pixels at 100 per grid square), NDC coordinates are O(1).

/// Generic float comparison tolerance for O(1) quantities (dot products of
/// unit vectors, barycentric coordinates, NDC values).
pub(crate) const EPS: f64 = 1e-8;
/// Ray parameter below which a hit counts as "origin on the surface".
pub(crate) const RAY_T_EPS: f64 = 1e-6;
/// Determinant cutoff for ray/triangle and ray/quad tests.
pub(crate) const DET_EPS: f64 = 1e-12;
/// Squared distance under which two world points are the same vertex.
pub(crate) const DIST2_EPS: f64 = 1e-10;
/// Collinearity cutoff used by `clean()` (area of the parallelogram spanned
/// by two consecutive edges, relative to their lengths).
pub(crate) const COLLINEAR_EPS: f64 = 1e-9;
/// Stand-in for an infinite elevation when building 3D geometry.
pub(crate) const MAX_ELEVATION: f64 = 1e6;
