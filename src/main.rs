// src/main.rs

use anyhow::{Context, Result};
use lane_tracker::frame_source::{find_mask_files, load_mask};
use lane_tracker::report::{FrameRecord, ReportWriter};
use lane_tracker::{debug, Config, LaneTracker};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.yaml";

/// Config from the first argument, `LANE_TRACKER_CONFIG`, or `config.yaml`.
/// Returns the path it was read from, `None` when running on defaults.
fn load_config() -> Result<(Config, Option<String>)> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LANE_TRACKER_CONFIG").ok());

    match explicit {
        Some(path) => Ok((Config::load(&path)?, Some(path))),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Ok((Config::load(DEFAULT_CONFIG)?, Some(DEFAULT_CONFIG.to_string())))
        }
        None => Ok((Config::default(), None)),
    }
}

fn main() -> Result<()> {
    let (config, config_source) = load_config()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("lane_tracker=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🛣️  Lane Tracker Starting");
    match &config_source {
        Some(path) => info!("✓ Configuration loaded from {}", path),
        None => warn!("{} not found, running with default configuration", DEFAULT_CONFIG),
    }
    info!(
        "Search: {} windows, margin {}/{}, minpix {}, reseed below {} px | history {}",
        config.search.nwindows,
        config.search.seed_margin,
        config.search.prior_margin,
        config.search.minpix,
        config.search.reseed_min_pixels,
        config.tracking.history_length
    );

    let frames = find_mask_files(&config.input.mask_dir)?;
    if frames.is_empty() {
        error!("No mask frames found in {}", config.input.mask_dir);
        return Ok(());
    }

    let debug_dir = config.output.debug_dir.as_ref().map(PathBuf::from);
    if let Some(dir) = &debug_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut tracker = LaneTracker::new(&config)?;
    let mut writer = ReportWriter::create(&config.output.measurements_path)?;

    for path in &frames {
        let mask = match load_mask(path) {
            Ok(mask) => mask,
            Err(e) => {
                // An unreadable frame is skipped; tracks carry over unchanged
                warn!("⚠️ Skipping {}: {:#}", path.display(), e);
                continue;
            }
        };

        let result = tracker.process(&mask);

        if let Ok(m) = &result.measurement {
            info!(
                "Frame {:>5} | curvature {:>10.0} m | position {}",
                result.frame_index,
                m.curvature_radius_m,
                m.offset_label()
            );
        }

        let record = FrameRecord::new(&result, Some(path), config.output.include_curves);
        writer.write(&record)?;

        if let Some(dir) = &debug_dir {
            let img = debug::render_frame(&mask, &result, tracker.left(), tracker.right());
            let out = dir.join(format!("frame_{:06}.png", result.frame_index));
            if let Err(e) = img.save(&out) {
                warn!("⚠️ Failed to save debug frame {}: {}", out.display(), e);
            }
        }
    }

    let written = writer.finish()?;
    let summary = tracker.metrics().summary();

    info!("\n========================================");
    info!("✓ Processed {} frames ({:.1} fps)", summary.total_frames, summary.fps);
    info!(
        "  Searches: {} seed, {} prior, {} re-seeded",
        summary.seed_searches, summary.prior_searches, summary.reseeds
    );
    info!(
        "  Fit failures: left {}, right {}",
        summary.left_fit_failures, summary.right_fit_failures
    );
    info!(
        "  Measured frames: {} | report lines: {} → {}",
        summary.measured_frames, written, config.output.measurements_path
    );
    info!("  Summary: {}", serde_json::to_string(&summary)?);
    info!("========================================");

    Ok(())
}
