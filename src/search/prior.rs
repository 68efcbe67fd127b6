// src/search/prior.rs
//
// Warm-start lane pixel search: keep only pixels within ±margin columns of the
// previous smoothed curve. Cost is proportional to band area, not frame area.

use super::clip_range;
use crate::analysis::curve_track::CurveTrack;
use crate::mask::BinaryMask;
use crate::types::LanePixels;

/// Clipped band rows for one side, `(y, x_low, x_high)` per row.
#[derive(Debug, Clone, Default)]
pub struct PriorBand {
    pub rows: Vec<(usize, usize, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct PriorSearchResult {
    pub pixels: LanePixels,
    pub band: PriorBand,
}

/// Collect on-pixels inside the band around `track.best_plotx()`.
///
/// Returns `None` when the track has no usable smoothed curve for this mask
/// (never fitted, or fitted at a different frame height). Callers must then
/// fall back to the sliding window search.
pub fn prior_search(mask: &BinaryMask, track: &CurveTrack, margin: u32) -> Option<PriorSearchResult> {
    let best = track.best_plotx()?;
    if best.len() != mask.height() {
        return None;
    }

    let margin = margin as i64;
    let mut pixels = LanePixels::default();
    let mut band = PriorBand {
        rows: Vec::with_capacity(best.len()),
    };

    for (y, &center) in best.iter().enumerate() {
        let center = center as i64;
        let (x0, x1) = clip_range(center - margin, center + margin, mask.width());
        band.rows.push((y, x0, x1));
        for (dx, &v) in mask.row(y)[x0..x1].iter().enumerate() {
            if v != 0 {
                pixels.push((x0 + dx) as i64, y as i64);
            }
        }
    }

    Some(PriorSearchResult { pixels, band })
}
