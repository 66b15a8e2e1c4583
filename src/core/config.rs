use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable image-processing parameters shared by the detection and
/// recognition stages. Passed explicitly to every stage that reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageParams {
    /// Non-local means filter strength (`h`).
    pub denoising_strength: f32,
    /// Side of the square patch compared by the denoiser. Odd.
    pub template_window_size: u32,
    /// Side of the square neighbourhood searched by the denoiser. Odd.
    pub search_window_size: u32,
    /// Dilated blobs larger than this are treated as watermark.
    pub contour_area_threshold: f64,
    /// Number of largest page contours kept as record boxes.
    pub max_contours: usize,
    /// Contrast multiplier applied before serial-number recognition.
    pub contrast_enhancement: f32,
    /// Width of the window cropped left of the rightmost digit column.
    pub number_crop_width: u32,
    pub save_debug_images: bool,
    /// Save a per-box debug image every n-th box.
    pub debug_image_interval: usize,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            denoising_strength: 10.0,
            template_window_size: 7,
            search_window_size: 21,
            contour_area_threshold: 100.0,
            max_contours: 30,
            contrast_enhancement: 2.0,
            number_crop_width: 30,
            save_debug_images: false,
            debug_image_interval: 5,
        }
    }
}

impl ImageParams {
    /// Load parameters from a JSON file. Keys that are absent keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read parameter file {}", path.display()))?;
        let params = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse parameter file {}", path.display()))?;
        Ok(params)
    }
}
