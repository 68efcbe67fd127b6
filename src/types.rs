use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub tracking: TrackingConfig,
    pub measurement: MeasurementConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Hyperparameters for the sliding-window and band searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of horizontal bands the mask height is split into.
    pub nwindows: usize,
    /// Half-width of a sliding window in pixels.
    pub seed_margin: u32,
    /// A window must hold MORE than this many pixels to recenter.
    pub minpix: usize,
    /// Half-width of the band around the previous curve in pixels.
    pub prior_margin: u32,
    /// Warm-start results with fewer real pixels are re-searched from scratch
    /// on the same frame. 0 disables the fallback.
    pub reseed_min_pixels: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            nwindows: 9,
            seed_margin: 75,
            minpix: 50,
            prior_margin: 100,
            reseed_min_pixels: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Capacity of the fit history ring buffer per side.
    pub history_length: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { history_length: 25 }
    }
}

/// Pixel-to-meter scale of the top-down view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    pub ym_per_pix: f64,
    pub xm_per_pix: f64,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            ym_per_pix: 40.0 / 720.0,
            xm_per_pix: 3.7 / 600.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mask_dir: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mask_dir: "masks".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub measurements_path: String,
    pub debug_dir: Option<String>,
    /// Write full `best_plotx` curves into every report line.
    pub include_curves: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            measurements_path: "output/measurements.jsonl".to_string(),
            debug_dir: None,
            include_curves: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "lane_tracker=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneSide {
    Left,
    Right,
}

impl LaneSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Pixel coordinates attributed to one lane boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanePixels {
    pub xs: Vec<i64>,
    pub ys: Vec<i64>,
}

impl LanePixels {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, x: i64, y: i64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// How a side's pixels were found on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Histogram + sliding windows (track was not detected).
    Seed,
    /// Band around the previous smoothed curve.
    Prior,
    /// Band search came back too sparse, sliding windows ran on the same frame.
    Reseeded,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "SEED",
            Self::Prior => "PRIOR",
            Self::Reseeded => "RESEEDED",
        }
    }
}

/// Real-world lane geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaneMeasurement {
    /// Mean radius of curvature of both boundaries in meters.
    pub curvature_radius_m: f64,
    pub left_radius_m: f64,
    pub right_radius_m: f64,
    /// Lane center minus frame center, in meters. Positive when the lane
    /// center lies right of the frame center.
    pub offset_m: f64,
}

impl LaneMeasurement {
    pub fn offset_label(&self) -> String {
        // side is chosen from the printed precision, so -0.001 is "center"
        let cm = (self.offset_m * 100.0).round();
        if cm > 0.0 {
            format!("{:.2} m right", self.offset_m)
        } else if cm < 0.0 {
            format!("{:.2} m left", -self.offset_m)
        } else {
            "center".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_tuned_values() {
        let config = Config::default();
        assert_eq!(config.search.nwindows, 9);
        assert_eq!(config.search.seed_margin, 75);
        assert_eq!(config.search.minpix, 50);
        assert_eq!(config.search.prior_margin, 100);
        assert_eq!(config.tracking.history_length, 25);
        assert!((config.measurement.ym_per_pix - 40.0 / 720.0).abs() < 1e-15);
        assert!((config.measurement.xm_per_pix - 3.7 / 600.0).abs() < 1e-15);
    }

    #[test]
    fn test_offset_label() {
        let mut m = LaneMeasurement {
            curvature_radius_m: f64::INFINITY,
            left_radius_m: f64::INFINITY,
            right_radius_m: f64::INFINITY,
            offset_m: 0.25,
        };
        assert_eq!(m.offset_label(), "0.25 m right");
        m.offset_m = -0.247;
        assert_eq!(m.offset_label(), "0.25 m left");
        m.offset_m = 0.0;
        assert_eq!(m.offset_label(), "center");
    }

    #[test]
    fn test_offset_label_below_print_precision_is_center() {
        let mut m = LaneMeasurement {
            curvature_radius_m: f64::INFINITY,
            left_radius_m: f64::INFINITY,
            right_radius_m: f64::INFINITY,
            offset_m: -0.001,
        };
        assert_eq!(m.offset_label(), "center");
        m.offset_m = 0.004;
        assert_eq!(m.offset_label(), "center");
        m.offset_m = -0.006;
        assert_eq!(m.offset_label(), "0.01 m left");
    }

    #[test]
    fn test_lane_pixels_push_keeps_columns_aligned() {
        let mut px = LanePixels::with_capacity(2);
        px.push(10, 20);
        px.push(11, 21);
        assert_eq!(px.len(), 2);
        assert_eq!(px.iter().collect::<Vec<_>>(), vec![(10, 20), (11, 21)]);
    }
}
