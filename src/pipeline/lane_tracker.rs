// src/pipeline/lane_tracker.rs
//
// Frame-sequential driver. Owns the two CurveTracks for the lifetime of a
// run; everything else it calls is a pure function of the mask and the
// tracks as they stood at the end of the previous frame.
//
// Per frame and per side:
//   detected  → band search around best_plotx
//                 └ fewer than reseed_min_pixels real pixels → sliding windows
//   !detected → sliding windows
//   → quadratic fit into the track → geometry over both tracks
//
// Processing is order-dependent (warm start, history), hence `&mut self`.

use super::metrics::TrackerMetrics;
use crate::analysis::{
    fit_track, CurveSnapshot, CurveTrack, FitError, GeometryError, GeometryMeasurer, Quadratic,
};
use crate::mask::BinaryMask;
use crate::search::{prior_search, seed_search, PriorBand, SeedSearchResult};
use crate::types::{Config, LaneMeasurement, LanePixels, LaneSide, SearchConfig, SearchMode};
use anyhow::Result;
use image::DynamicImage;
use tracing::{debug, info, warn};

/// What happened to one side on one frame.
#[derive(Debug, Clone)]
pub struct SideOutcome {
    pub side: LaneSide,
    pub mode: SearchMode,
    pub pixels: LanePixels,
    pub fit: Result<Quadratic, FitError>,
    /// Band used by the warm-start search, if one ran.
    pub band: Option<PriorBand>,
    /// Track state after this frame's fit.
    pub track: CurveSnapshot,
}

impl SideOutcome {
    pub fn fitted(&self) -> bool {
        self.fit.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct FrameResult {
    pub frame_index: u64,
    pub width: usize,
    pub height: usize,
    pub left: SideOutcome,
    pub right: SideOutcome,
    /// Err until both sides have been fitted at least once.
    pub measurement: Result<LaneMeasurement, GeometryError>,
    /// Sliding-window scan of this frame, if any side needed one.
    pub seed: Option<SeedSearchResult>,
}

pub struct LaneTracker {
    search: SearchConfig,
    measurer: GeometryMeasurer,
    left: CurveTrack,
    right: CurveTrack,
    frame_dims: Option<(usize, usize)>,
    frame_index: u64,
    metrics: TrackerMetrics,
}

impl LaneTracker {
    /// Rejects a config that `Config::validate` rejects.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let history = config.tracking.history_length;
        Ok(Self {
            search: config.search.clone(),
            measurer: GeometryMeasurer::new(config.measurement),
            left: CurveTrack::new(LaneSide::Left, history),
            right: CurveTrack::new(LaneSide::Right, history),
            frame_dims: None,
            frame_index: 0,
            metrics: TrackerMetrics::new(),
        })
    }

    pub fn left(&self) -> &CurveTrack {
        &self.left
    }

    pub fn right(&self) -> &CurveTrack {
        &self.right
    }

    pub fn track(&self, side: LaneSide) -> &CurveTrack {
        match side {
            LaneSide::Left => &self.left,
            LaneSide::Right => &self.right,
        }
    }

    pub fn metrics(&self) -> &TrackerMetrics {
        &self.metrics
    }

    /// Drop both tracks back to the cold-start state.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.frame_dims = None;
    }

    /// Reduce a decoded image to a binary mask and process it.
    pub fn process_image(&mut self, img: &DynamicImage) -> FrameResult {
        let mask = BinaryMask::from_dynamic(img);
        self.process(&mask)
    }

    pub fn process(&mut self, mask: &BinaryMask) -> FrameResult {
        let dims = (mask.width(), mask.height());
        if let Some(prev) = self.frame_dims {
            if prev != dims {
                warn!(
                    "⚠️ Frame size changed {}x{} → {}x{}, resetting lane tracks",
                    prev.0, prev.1, dims.0, dims.1
                );
                self.reset();
                self.metrics.frame_size_resets += 1;
            }
        }
        self.frame_dims = Some(dims);

        let ploty: Vec<f64> = (0..mask.height()).map(|y| y as f64).collect();
        let mut seed: Option<SeedSearchResult> = None;

        let (left_mode, left_pixels, left_band) = self.find_pixels(mask, LaneSide::Left, &mut seed);
        let (right_mode, right_pixels, right_band) =
            self.find_pixels(mask, LaneSide::Right, &mut seed);

        let left_fit = fit_track(&mut self.left, &left_pixels, &ploty);
        let right_fit = fit_track(&mut self.right, &right_pixels, &ploty);

        self.metrics.total_frames += 1;
        self.metrics.record_search(left_mode);
        self.metrics.record_search(right_mode);
        for (side, fit) in [(LaneSide::Left, &left_fit), (LaneSide::Right, &right_fit)] {
            if fit.is_err() {
                self.metrics.record_fit_failure(side);
            }
        }

        let measurement = self.measure(mask.width());

        let result = FrameResult {
            frame_index: self.frame_index,
            width: mask.width(),
            height: mask.height(),
            left: SideOutcome {
                side: LaneSide::Left,
                mode: left_mode,
                pixels: left_pixels,
                fit: left_fit,
                band: left_band,
                track: self.left.snapshot(),
            },
            right: SideOutcome {
                side: LaneSide::Right,
                mode: right_mode,
                pixels: right_pixels,
                fit: right_fit,
                band: right_band,
                track: self.right.snapshot(),
            },
            measurement,
            seed,
        };

        debug!(
            "Frame {}: L {} {} px {} | R {} {} px {}",
            result.frame_index,
            result.left.mode.as_str(),
            result.left.pixels.len(),
            if result.left.fitted() { "✓" } else { "✗" },
            result.right.mode.as_str(),
            result.right.pixels.len(),
            if result.right.fitted() { "✓" } else { "✗" },
        );

        self.frame_index += 1;
        result
    }

    /// Pick the search for one side and run it. The sliding-window scan
    /// covers both sides at once, so it is computed at most once per frame.
    fn find_pixels(
        &self,
        mask: &BinaryMask,
        side: LaneSide,
        seed: &mut Option<SeedSearchResult>,
    ) -> (SearchMode, LanePixels, Option<PriorBand>) {
        let track = self.track(side);

        if track.detected() {
            if let Some(prior) = prior_search(mask, track, self.search.prior_margin) {
                if prior.pixels.len() >= self.search.reseed_min_pixels {
                    return (SearchMode::Prior, prior.pixels, Some(prior.band));
                }
                info!(
                    "🔄 {} band search found {} px (< {}), re-seeding",
                    side.as_str(),
                    prior.pixels.len(),
                    self.search.reseed_min_pixels
                );
                let scan = seed.get_or_insert_with(|| seed_search(mask, &self.search));
                return (
                    SearchMode::Reseeded,
                    scan.pixels(side).clone(),
                    Some(prior.band),
                );
            }
        }

        let scan = seed.get_or_insert_with(|| seed_search(mask, &self.search));
        (SearchMode::Seed, scan.pixels(side).clone(), None)
    }

    fn measure(&mut self, frame_width: usize) -> Result<LaneMeasurement, GeometryError> {
        match self.measurer.measure(&self.left, &self.right, frame_width) {
            Ok(m) => {
                let left_base = self.measurer.line_base_pos(&self.left, frame_width).ok();
                let right_base = self.measurer.line_base_pos(&self.right, frame_width).ok();
                self.left.set_measurements(Some(m.left_radius_m), left_base);
                self.right.set_measurements(Some(m.right_radius_m), right_base);
                self.metrics.measured_frames += 1;
                Ok(m)
            }
            Err(e) => {
                warn!("⚠️ Frame {}: no lane geometry: {}", self.frame_index, e);
                Err(e)
            }
        }
    }
}
