// src/analysis/curve_fitter.rs
//
// Feeds one side's search result into its track. A failed fit is returned to
// the caller for logging, but the track has already absorbed it as
// `detected = false`; nothing here aborts the frame.

use super::curve_track::CurveTrack;
use super::polynomial::{fit_pixels, FitError, Quadratic};
use crate::types::LanePixels;
use tracing::debug;

pub fn fit_track(
    track: &mut CurveTrack,
    pixels: &LanePixels,
    ploty: &[f64],
) -> Result<Quadratic, FitError> {
    match fit_pixels(pixels) {
        Ok(fit) => {
            track.update_fitted(fit, ploty);
            debug!(
                "  📐 {} fit: a={:.6} b={:.4} c={:.1} | pts={} | history={}",
                track.side().as_str(),
                fit.a,
                fit.b,
                fit.c,
                pixels.len(),
                track.history_len()
            );
            Ok(fit)
        }
        Err(e) => {
            track.mark_lost();
            debug!(
                "  ⚠️ {} fit rejected: {} ({} pts, {} misses)",
                track.side().as_str(),
                e,
                pixels.len(),
                track.consecutive_misses()
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LaneSide;

    fn ploty(h: usize) -> Vec<f64> {
        (0..h).map(|y| y as f64).collect()
    }

    #[test]
    fn test_success_updates_track() {
        let mut track = CurveTrack::new(LaneSide::Left, 25);
        let mut px = LanePixels::default();
        for y in 0..50 {
            px.push(200, y);
        }
        let fit = fit_track(&mut track, &px, &ploty(50)).unwrap();
        assert!((fit.c - 200.0).abs() < 1e-9);
        assert!(track.detected());
        assert_eq!(track.bottom_x(), Some(200));
    }

    #[test]
    fn test_failure_flips_detected_only() {
        let mut track = CurveTrack::new(LaneSide::Right, 25);
        let mut px = LanePixels::default();
        for y in 0..50 {
            px.push(900, y);
        }
        fit_track(&mut track, &px, &ploty(50)).unwrap();

        let err = fit_track(&mut track, &LanePixels::default(), &ploty(50)).unwrap_err();
        assert_eq!(err, FitError::TooFewPoints(0));
        assert!(!track.detected());
        assert_eq!(track.bottom_x(), Some(900), "stale curve stays usable");
        assert_eq!(track.history_len(), 1);
    }
}
