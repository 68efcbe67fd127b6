// src/pipeline/mod.rs

pub mod lane_tracker;
pub mod metrics;

pub use lane_tracker::{FrameResult, LaneTracker, SideOutcome};
pub use metrics::{MetricsSummary, TrackerMetrics};
