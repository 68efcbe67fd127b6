//! Lane boundary tracking on top-down binary masks.
//!
//! Per frame: [`mask::BinaryMask`] → sliding-window or band search
//! ([`search`]) → quadratic fit into a per-side [`analysis::CurveTrack`] →
//! curvature and lateral offset ([`analysis::GeometryMeasurer`]).
//! [`pipeline::LaneTracker`] drives the sequence and owns both tracks.

pub mod analysis;
pub mod config;
pub mod debug;
pub mod frame_source;
pub mod mask;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod types;

pub use analysis::{CurveTrack, FitError, GeometryError, GeometryMeasurer, Quadratic};
pub use mask::BinaryMask;
pub use pipeline::{FrameResult, LaneTracker};
pub use types::{Config, LaneMeasurement, LaneSide, SearchMode};
