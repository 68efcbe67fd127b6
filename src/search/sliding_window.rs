// src/search/sliding_window.rs
//
// Cold-start lane pixel search.
//
// The bottom half of the mask is collapsed into a column histogram; the peak
// of each half seeds one boundary. The mask height is then cut into
// `nwindows` bands and scanned bottom-to-top. Each band gets a window of
// width 2·margin around the side's current column:
//
//   - more than `minpix` pixels inside → recenter on their mean column
//   - otherwise → keep the column and emit one artificial sample at the
//     window center, so a dashed marking with a gap still pins the fit
//
// An all-black mask therefore still returns `nwindows` samples per side.
// A mask shorter than `nwindows` rows gets one window per row instead.

use super::clip_range;
use crate::mask::BinaryMask;
use crate::types::{LaneSide, LanePixels, SearchConfig};
use tracing::debug;

/// One scanned window, kept for debug rendering and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub side: LaneSide,
    pub x_low: i64,
    pub x_high: i64,
    pub y_low: i64,
    pub y_high: i64,
    /// Real on-pixels found inside the (clipped) window.
    pub pixel_count: usize,
    /// Whether the next window was recentered from this one.
    pub recentered: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SeedSearchResult {
    pub left: LanePixels,
    pub right: LanePixels,
    /// Histogram peaks the scan started from.
    pub left_base: i64,
    pub right_base: i64,
    pub windows: Vec<SearchWindow>,
}

impl SeedSearchResult {
    pub fn pixels(&self, side: LaneSide) -> &LanePixels {
        match side {
            LaneSide::Left => &self.left,
            LaneSide::Right => &self.right,
        }
    }
}

/// Per-side scan state.
struct SideScan {
    side: LaneSide,
    current_x: i64,
    real: LanePixels,
    artificial: LanePixels,
}

impl SideScan {
    fn new(side: LaneSide, base: i64) -> Self {
        Self {
            side,
            current_x: base,
            real: LanePixels::default(),
            artificial: LanePixels::default(),
        }
    }

    fn scan_window(
        &mut self,
        mask: &BinaryMask,
        y_low: i64,
        y_high: i64,
        config: &SearchConfig,
    ) -> SearchWindow {
        let margin = config.seed_margin as i64;
        let x_low = self.current_x - margin;
        let x_high = self.current_x + margin;

        let (cx0, cx1) = clip_range(x_low, x_high, mask.width());
        let (cy0, cy1) = clip_range(y_low, y_high, mask.height());

        let mut count = 0usize;
        let mut sum_x = 0i64;
        for y in cy0..cy1 {
            let row = &mask.row(y)[cx0..cx1];
            for (dx, &v) in row.iter().enumerate() {
                if v != 0 {
                    let x = (cx0 + dx) as i64;
                    self.real.push(x, y as i64);
                    sum_x += x;
                    count += 1;
                }
            }
        }

        let recentered = count > config.minpix;
        if recentered {
            // integer division truncates; the mean of in-frame columns is non-negative
            self.current_x = sum_x / count as i64;
        } else {
            self.artificial.push(self.current_x, (y_low + y_high) / 2);
        }

        SearchWindow {
            side: self.side,
            x_low,
            x_high,
            y_low,
            y_high,
            pixel_count: count,
            recentered,
        }
    }

    fn finish(mut self) -> LanePixels {
        self.real.xs.extend_from_slice(&self.artificial.xs);
        self.real.ys.extend_from_slice(&self.artificial.ys);
        self.real
    }
}

/// Index of the first maximum, 0 for an empty slice.
fn argmax(values: &[u32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Histogram-seeded sliding window search over the whole mask.
pub fn seed_search(mask: &BinaryMask, config: &SearchConfig) -> SeedSearchResult {
    let height = mask.height() as i64;
    let histogram = mask.column_histogram(mask.height() / 2);
    let midpoint = mask.width() / 2;

    let left_base = argmax(&histogram[..midpoint]) as i64;
    let right_base = (argmax(&histogram[midpoint..]) + midpoint) as i64;

    let nwindows = config.nwindows.max(1).min(mask.height().max(1));
    let window_height = (height / nwindows as i64).max(1);

    let mut left = SideScan::new(LaneSide::Left, left_base);
    let mut right = SideScan::new(LaneSide::Right, right_base);
    let mut windows = Vec::with_capacity(nwindows * 2);

    for window in 0..nwindows as i64 {
        let y_low = height - (window + 1) * window_height;
        let y_high = height - window * window_height;

        windows.push(left.scan_window(mask, y_low, y_high, config));
        windows.push(right.scan_window(mask, y_low, y_high, config));
    }

    let left_artificial = left.artificial.len();
    let right_artificial = right.artificial.len();
    let left = left.finish();
    let right = right.finish();

    debug!(
        "Seed search: bases L={} R={} | left {} px ({} artificial) | right {} px ({} artificial)",
        left_base,
        right_base,
        left.len(),
        left_artificial,
        right.len(),
        right_artificial
    );

    SeedSearchResult {
        left,
        right,
        left_base,
        right_base,
        windows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_lines(width: usize, height: usize, columns: &[usize]) -> BinaryMask {
        let mut mask = BinaryMask::new(width, height);
        for &x in columns {
            for y in 0..height {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn test_argmax_first_maximum() {
        assert_eq!(argmax(&[1, 5, 5, 2]), 1);
        assert_eq!(argmax(&[]), 0);
        assert_eq!(argmax(&[0, 0, 0]), 0);
    }

    #[test]
    fn test_recovers_two_vertical_lines() {
        let config = SearchConfig::default();
        let mask = vertical_lines(1280, 720, &[300, 900]);
        let result = seed_search(&mask, &config);

        assert_eq!(result.left_base, 300);
        assert_eq!(result.right_base, 900);
        assert_eq!(result.left.len(), 720, "every row of the left line");
        assert_eq!(result.right.len(), 720, "every row of the right line");
        assert!(result.left.xs.iter().all(|&x| x == 300));
        assert!(result.right.xs.iter().all(|&x| x == 900));
        assert!(result.windows.iter().all(|w| w.recentered));
    }

    #[test]
    fn test_recovery_at_various_separations() {
        let config = SearchConfig::default();
        let margin = config.seed_margin as i64;
        for &(l, r) in &[(490usize, 640usize), (100, 1200), (639, 800), (200, 650)] {
            let mask = vertical_lines(1280, 720, &[l, r]);
            let result = seed_search(&mask, &config);
            for &x in &result.left.xs {
                assert!((x - l as i64).abs() <= margin, "left {} strayed to {}", l, x);
            }
            for &x in &result.right.xs {
                assert!((x - r as i64).abs() <= margin, "right {} strayed to {}", r, x);
            }
        }
    }

    #[test]
    fn test_empty_side_yields_artificial_points() {
        let config = SearchConfig::default();
        let mask = vertical_lines(1280, 720, &[300]);
        let result = seed_search(&mask, &config);

        assert_eq!(result.right.len(), config.nwindows);
        assert!(
            result.right.xs.iter().all(|&x| x == 640),
            "empty right half seeds at the midpoint"
        );
        let expected_ys: Vec<i64> = (0..9).map(|w| 720 - w * 80 - 40).collect();
        assert_eq!(result.right.ys, expected_ys);
    }

    #[test]
    fn test_all_black_mask_is_never_empty() {
        let config = SearchConfig::default();
        let mask = BinaryMask::new(200, 90);
        let result = seed_search(&mask, &config);
        assert_eq!(result.left.len(), 9);
        assert_eq!(result.right.len(), 9);
        assert!(result.left.xs.iter().all(|&x| x == 0));
        assert!(result.right.xs.iter().all(|&x| x == 100));
    }

    #[test]
    fn test_dashed_line_mixes_real_and_artificial() {
        let config = SearchConfig::default();
        let mut mask = BinaryMask::new(1280, 720);
        // 3px wide dashes in every other band: 240 px per dash band > minpix
        for band in (0..9).step_by(2) {
            for y in band * 80..(band + 1) * 80 {
                for x in 299..302 {
                    mask.set(x, y, true);
                }
            }
        }
        let result = seed_search(&mask, &config);
        let left_windows: Vec<_> = result
            .windows
            .iter()
            .filter(|w| w.side == LaneSide::Left)
            .collect();
        let gaps = left_windows.iter().filter(|w| !w.recentered).count();
        assert_eq!(gaps, 4);
        assert_eq!(result.left.len(), 5 * 240 + 4);
        // artificial points come last and sit on the tracked column
        assert!(result.left.xs[5 * 240..].iter().all(|&x| x == 300));
    }

    #[test]
    fn test_mask_shorter_than_window_count() {
        let config = SearchConfig::default();
        let mask = BinaryMask::new(200, 4);
        let result = seed_search(&mask, &config);

        // one window per row and side
        assert_eq!(result.windows.len(), 8);
        for pixels in [&result.left, &result.right] {
            assert_eq!(pixels.len(), 4);
            assert!(pixels.ys.iter().all(|&y| (0..4).contains(&y)));
        }
        let mut rows = result.left.ys.clone();
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_windows_clip_at_border() {
        let config = SearchConfig::default();
        let mask = vertical_lines(400, 90, &[2, 398]);
        let result = seed_search(&mask, &config);
        assert_eq!(result.left_base, 2);
        assert!(result.windows.iter().any(|w| w.x_low < 0));
        assert!(result.windows.iter().any(|w| w.x_high > 400));
        assert!(result.left.xs.iter().all(|&x| x == 2));
        assert!(result.right.xs.iter().all(|&x| x == 398));
    }

    #[test]
    fn test_sparse_window_does_not_recenter() {
        let config = SearchConfig::default();
        let mut mask = BinaryMask::new(1280, 720);
        // 50 pixels is not MORE than minpix
        for y in 650..700 {
            mask.set(350, y, true);
        }
        let result = seed_search(&mask, &config);
        let first = result.windows[0];
        assert_eq!(first.pixel_count, 50);
        assert!(!first.recentered);
        assert_eq!(result.left.len(), 50 + 9);
    }
}
