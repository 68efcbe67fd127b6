// src/analysis/curve_track.rs
//
// Persistent per-boundary state carried across frames.
//
// The fit history is a newest-first ring buffer; `best_plotx` is the
// column-wise mean of the evaluated curves in it, rounded to pixel columns,
// and is what every consumer reads (band search, geometry, debug overlay).
//
// Only the curve fitter mutates history. Searches and the measurer borrow
// the track immutably.

use super::polynomial::Quadratic;
use crate::types::LaneSide;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct CurveTrack {
    side: LaneSide,
    capacity: usize,
    /// Whether the last frame produced a usable fit. Gates warm vs cold search.
    detected: bool,
    ploty: Vec<f64>,
    current_fit: Option<Quadratic>,
    current_plotx: Vec<f64>,
    fit_history: VecDeque<Quadratic>,
    plotx_history: VecDeque<Vec<f64>>,
    best_plotx: Option<Vec<i32>>,
    radius_of_curvature: Option<f64>,
    line_base_pos: Option<f64>,
    consecutive_misses: u32,
}

/// Read-only view of a track handed to renderers and reports.
#[derive(Debug, Clone, Serialize)]
pub struct CurveSnapshot {
    pub side: LaneSide,
    pub detected: bool,
    pub current_fit: Option<Quadratic>,
    pub history_len: usize,
    pub ploty: Vec<f64>,
    pub best_plotx: Option<Vec<i32>>,
}

impl CurveTrack {
    pub fn new(side: LaneSide, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            side,
            capacity,
            detected: false,
            ploty: Vec::new(),
            current_fit: None,
            current_plotx: Vec::new(),
            fit_history: VecDeque::with_capacity(capacity),
            plotx_history: VecDeque::with_capacity(capacity),
            best_plotx: None,
            radius_of_curvature: None,
            line_base_pos: None,
            consecutive_misses: 0,
        }
    }

    pub fn side(&self) -> LaneSide {
        self.side
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn detected(&self) -> bool {
        self.detected
    }

    pub fn ploty(&self) -> &[f64] {
        &self.ploty
    }

    pub fn current_fit(&self) -> Option<Quadratic> {
        self.current_fit
    }

    pub fn current_plotx(&self) -> &[f64] {
        &self.current_plotx
    }

    pub fn fit_history(&self) -> impl Iterator<Item = &Quadratic> {
        self.fit_history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.fit_history.len()
    }

    /// Smoothed curve, `None` until the first successful fit.
    pub fn best_plotx(&self) -> Option<&[i32]> {
        self.best_plotx.as_deref()
    }

    /// Smoothed x at the bottom row of the frame.
    pub fn bottom_x(&self) -> Option<i32> {
        self.best_plotx.as_ref().and_then(|v| v.last().copied())
    }

    pub fn radius_of_curvature(&self) -> Option<f64> {
        self.radius_of_curvature
    }

    pub fn line_base_pos(&self) -> Option<f64> {
        self.line_base_pos
    }

    /// Frames since the last successful fit.
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    pub fn snapshot(&self) -> CurveSnapshot {
        CurveSnapshot {
            side: self.side,
            detected: self.detected,
            current_fit: self.current_fit,
            history_len: self.fit_history.len(),
            ploty: self.ploty.clone(),
            best_plotx: self.best_plotx.clone(),
        }
    }

    /// Store a new fit evaluated over `ploty` and refresh the smoothed curve.
    pub(crate) fn update_fitted(&mut self, fit: Quadratic, ploty: &[f64]) {
        if self.ploty.len() != ploty.len() {
            // Row grid changed, older curves are not comparable
            self.fit_history.clear();
            self.plotx_history.clear();
        }
        self.ploty = ploty.to_vec();
        self.current_fit = Some(fit);
        self.current_plotx = fit.eval_all(ploty);

        self.fit_history.push_front(fit);
        self.plotx_history.push_front(self.current_plotx.clone());
        self.fit_history.truncate(self.capacity);
        self.plotx_history.truncate(self.capacity);

        self.best_plotx = Some(self.mean_plotx());
        self.detected = true;
        self.consecutive_misses = 0;
    }

    /// Fit failed this frame: stop warm-starting, keep the stale curve.
    pub(crate) fn mark_lost(&mut self) {
        self.detected = false;
        self.consecutive_misses = self.consecutive_misses.saturating_add(1);
    }

    pub(crate) fn set_measurements(&mut self, radius: Option<f64>, base_pos: Option<f64>) {
        self.radius_of_curvature = radius;
        self.line_base_pos = base_pos;
    }

    /// Forget everything, as at pipeline start.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.side, self.capacity);
    }

    fn mean_plotx(&self) -> Vec<i32> {
        let rows = self.ploty.len();
        let n = self.plotx_history.len() as f64;
        let mut sums = vec![0.0f64; rows];
        for curve in &self.plotx_history {
            for (sum, &x) in sums.iter_mut().zip(curve) {
                *sum += x;
            }
        }
        sums.into_iter().map(|s| (s / n).round() as i32).collect()
    }
}
