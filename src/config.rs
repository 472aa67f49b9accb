use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blob::hsv::HsvRange;

/// Settings of the data collection tool, stored as JSON.
///
/// Every field has a default, so a config file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// HSV range of the background. The tracked blob is the largest region outside of it.
    pub threshold: HsvRange,

    /// How long the render loop waits for a new camera frame before reusing the previous one.
    pub capture_timeout_ms: u64,

    /// Position of the camera image inside the window, in pixels.
    pub offset: (i32, i32),

    /// Directory that captured images are written to.
    pub output_dir: PathBuf,

    /// JPEG quality (0-100) of captured images.
    pub jpeg_quality: i32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            threshold: HsvRange::default(),
            capture_timeout_ms: 1000,
            offset: (0, 0),
            output_dir: PathBuf::from("captures"),
            jpeg_quality: 95,
        }
    }
}

impl ToolConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let config: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        if config.threshold.is_inverted() {
            log::warn!(
                "Threshold range in {} has a minimum above its maximum ({}); nothing will match it",
                path.display(),
                config.threshold
            );
        }
        if !(0..=100).contains(&config.jpeg_quality) {
            return Err(format!(
                "JPEG quality must be between 0 and 100, got {}",
                config.jpeg_quality
            )
            .into());
        }
        log::info!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::info!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        log::info!("Saved config file {}", path.display());
        Ok(())
    }
}
