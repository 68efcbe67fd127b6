// src/pipeline/metrics.rs
//
// Run counters for the tracker. Logged as a summary at the end of a run.

use crate::types::{LaneSide, SearchMode};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TrackerMetrics {
    pub total_frames: u64,
    pub seed_searches: u64,
    pub prior_searches: u64,
    pub reseeds: u64,
    pub left_fit_failures: u64,
    pub right_fit_failures: u64,
    pub measured_frames: u64,
    pub frame_size_resets: u64,
    pub started_at: Instant,
}

impl Default for TrackerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            seed_searches: 0,
            prior_searches: 0,
            reseeds: 0,
            left_fit_failures: 0,
            right_fit_failures: 0,
            measured_frames: 0,
            frame_size_resets: 0,
            started_at: Instant::now(),
        }
    }

    pub fn record_search(&mut self, mode: SearchMode) {
        match mode {
            SearchMode::Seed => self.seed_searches += 1,
            SearchMode::Prior => self.prior_searches += 1,
            SearchMode::Reseeded => {
                self.prior_searches += 1;
                self.seed_searches += 1;
                self.reseeds += 1;
            }
        }
    }

    pub fn record_fit_failure(&mut self, side: LaneSide) {
        match side {
            LaneSide::Left => self.left_fit_failures += 1,
            LaneSide::Right => self.right_fit_failures += 1,
        }
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            fps: self.fps(),
            seed_searches: self.seed_searches,
            prior_searches: self.prior_searches,
            reseeds: self.reseeds,
            left_fit_failures: self.left_fit_failures,
            right_fit_failures: self.right_fit_failures,
            measured_frames: self.measured_frames,
            frame_size_resets: self.frame_size_resets,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub seed_searches: u64,
    pub prior_searches: u64,
    pub reseeds: u64,
    pub left_fit_failures: u64,
    pub right_fit_failures: u64,
    pub measured_frames: u64,
    pub frame_size_resets: u64,
    pub elapsed_secs: f64,
}
