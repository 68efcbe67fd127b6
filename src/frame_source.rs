// src/frame_source.rs
//
// Top-down mask frames on disk. Frame order is path order, so sequences are
// expected to be named with zero-padded indices (frame_0001.png, ...).

use crate::mask::BinaryMask;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const MASK_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub fn find_mask_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        anyhow::bail!("Mask directory {} does not exist", dir.display());
    }

    let mut masks = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let is_mask = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| MASK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_mask {
            masks.push(path.to_path_buf());
        }
    }
    masks.sort();

    info!("Found {} mask frames in {}", masks.len(), dir.display());
    Ok(masks)
}

/// Decode an image file and reduce it to a binary mask.
pub fn load_mask(path: &Path) -> Result<BinaryMask> {
    let img = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(BinaryMask::from_dynamic(&img))
}
