// src/analysis/geometry.rs
//
// Real-world lane geometry from the two smoothed curves.
//
//   curvature: refit (ploty·ym, best_plotx·xm) in meters, evaluate
//              R = (1 + (2·a·y + b)²)^1.5 / |2·a| at the bottom row
//   offset:    ((right_bottom + left_bottom) - frame_width) / 2 · xm
//
// Offset is lane center minus frame center; positive means the lane center
// lies to the right of the camera axis.

use super::curve_track::CurveTrack;
use super::polynomial::{fit_quadratic, FitError};
use crate::types::{LaneMeasurement, LaneSide, MeasurementConfig};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Caller contract violation: measuring before the side was ever fitted.
    #[error("{} track has never been fitted", .0.as_str())]
    TrackNotFitted(LaneSide),
    #[error("{} curve refit in meters failed: {source}", .side.as_str())]
    Refit {
        side: LaneSide,
        #[source]
        source: FitError,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct GeometryMeasurer {
    scale: MeasurementConfig,
}

impl GeometryMeasurer {
    pub fn new(scale: MeasurementConfig) -> Self {
        Self { scale }
    }

    /// Radius of curvature of one side at the bottom of the frame, meters.
    pub fn side_radius(&self, track: &CurveTrack) -> Result<f64, GeometryError> {
        let best = track
            .best_plotx()
            .ok_or(GeometryError::TrackNotFitted(track.side()))?;
        let ploty = track.ploty();

        let ym = self.scale.ym_per_pix;
        let xm = self.scale.xm_per_pix;
        let ys: Vec<f64> = ploty.iter().map(|&y| y * ym).collect();
        let xs: Vec<f64> = best.iter().map(|&x| x as f64 * xm).collect();

        let fit = fit_quadratic(&xs, &ys).map_err(|source| GeometryError::Refit {
            side: track.side(),
            source,
        })?;

        let y_eval = ploty.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(fit.radius_at(y_eval * ym))
    }

    /// Mean radius of both sides plus the per-side radii.
    pub fn curvature_radius(
        &self,
        left: &CurveTrack,
        right: &CurveTrack,
    ) -> Result<(f64, f64, f64), GeometryError> {
        let l = self.side_radius(left)?;
        let r = self.side_radius(right)?;
        Ok(((l + r) / 2.0, l, r))
    }

    /// Lane center minus frame center at the bottom row, meters.
    pub fn lateral_offset(
        &self,
        left: &CurveTrack,
        right: &CurveTrack,
        frame_width: usize,
    ) -> Result<f64, GeometryError> {
        let l = left
            .bottom_x()
            .ok_or(GeometryError::TrackNotFitted(left.side()))?;
        let r = right
            .bottom_x()
            .ok_or(GeometryError::TrackNotFitted(right.side()))?;
        let px = ((r as f64 + l as f64) - frame_width as f64) / 2.0;
        Ok(px * self.scale.xm_per_pix)
    }

    /// Signed distance from the frame center to this line's bottom x, meters.
    pub fn line_base_pos(&self, track: &CurveTrack, frame_width: usize) -> Result<f64, GeometryError> {
        let x = track
            .bottom_x()
            .ok_or(GeometryError::TrackNotFitted(track.side()))?;
        Ok((x as f64 - frame_width as f64 / 2.0) * self.scale.xm_per_pix)
    }

    pub fn measure(
        &self,
        left: &CurveTrack,
        right: &CurveTrack,
        frame_width: usize,
    ) -> Result<LaneMeasurement, GeometryError> {
        let (mean, l, r) = self.curvature_radius(left, right)?;
        let offset = self.lateral_offset(left, right, frame_width)?;

        debug!(
            "  📏 Geometry: R={:.0}m (L={:.0} R={:.0}) | offset={:+.3}m",
            mean, l, r, offset
        );

        Ok(LaneMeasurement {
            curvature_radius_m: mean,
            left_radius_m: l,
            right_radius_m: r,
            offset_m: offset,
        })
    }
}
