// src/analysis/mod.rs
//
// Curve fitting and tracking.
//
// Signal flow:
//   LanePixels → polynomial (least squares) → curve_fitter → CurveTrack history
//   CurveTrack (left, right) → geometry → LaneMeasurement

pub mod curve_fitter;
pub mod curve_track;
pub mod geometry;
pub mod polynomial;

pub use curve_fitter::fit_track;
pub use curve_track::{CurveSnapshot, CurveTrack};
pub use geometry::{GeometryError, GeometryMeasurer};
pub use polynomial::{fit_quadratic, FitError, Quadratic};
