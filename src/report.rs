// src/report.rs
//
// One JSON object per frame, newline-delimited.

use crate::analysis::Quadratic;
use crate::pipeline::{FrameResult, SideOutcome};
use crate::types::{LaneMeasurement, SearchMode};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct SideRecord {
    pub mode: SearchMode,
    pub pixels: usize,
    pub detected: bool,
    /// Present when this frame's fit succeeded.
    pub fit: Option<Quadratic>,
    pub fit_error: Option<String>,
    pub bottom_x: Option<i32>,
    pub history_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_plotx: Option<Vec<i32>>,
}

impl SideRecord {
    pub fn new(outcome: &SideOutcome, include_curve: bool) -> Self {
        let track = &outcome.track;
        Self {
            mode: outcome.mode,
            pixels: outcome.pixels.len(),
            detected: track.detected,
            fit: outcome.fit.as_ref().ok().copied(),
            fit_error: outcome.fit.as_ref().err().map(|e| e.to_string()),
            bottom_x: track.best_plotx.as_ref().and_then(|b| b.last().copied()),
            history_len: track.history_len,
            best_plotx: if include_curve {
                track.best_plotx.clone()
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub source: Option<String>,
    pub width: usize,
    pub height: usize,
    pub left: SideRecord,
    pub right: SideRecord,
    /// Non-finite radii (straight lanes) serialize as null.
    pub measurement: Option<LaneMeasurement>,
    pub measurement_error: Option<String>,
}

impl FrameRecord {
    pub fn new(result: &FrameResult, source: Option<&Path>, include_curves: bool) -> Self {
        Self {
            frame: result.frame_index,
            source: source.map(|p| p.display().to_string()),
            width: result.width,
            height: result.height,
            left: SideRecord::new(&result.left, include_curves),
            right: SideRecord::new(&result.right, include_curves),
            measurement: result.measurement.as_ref().ok().copied(),
            measurement_error: result.measurement.as_ref().err().map(|e| e.to_string()),
        }
    }
}

pub struct ReportWriter {
    out: BufWriter<File>,
    records: u64,
}

impl ReportWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
            records: 0,
        })
    }

    pub fn write(&mut self, record: &FrameRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<u64> {
        self.out.flush()?;
        Ok(self.records)
    }
}
