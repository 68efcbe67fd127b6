// src/search/mod.rs
//
// Lane pixel search.
//
//   BinaryMask ─┬→ sliding_window (cold start, track not detected)
//               └→ prior          (warm start, band around best_plotx)
//
// Both stages are read-only over the mask and the tracks; only the curve
// fitter writes track state.

pub mod prior;
pub mod sliding_window;

pub use prior::{prior_search, PriorBand, PriorSearchResult};
pub use sliding_window::{seed_search, SearchWindow, SeedSearchResult};

/// Clip a half-open pixel range to `[0, limit)`.
#[inline]
pub(crate) fn clip_range(low: i64, high: i64, limit: usize) -> (usize, usize) {
    let limit = limit as i64;
    let lo = low.clamp(0, limit);
    let hi = high.clamp(0, limit);
    (lo as usize, hi.max(lo) as usize)
}
