/// Locating the largest blob outside an HSV color range
pub mod blob;

/// Camera capture running on its own thread
pub mod camera;

/// JSON configuration of the data collection tool
pub mod config;

/// Small helpers shared by the tool: frame rate measurement and file naming
pub mod utils;

/// The capture window with its overlay widgets and threshold controls
pub mod window;

/// Debug windows showing the intermediate images of a detection
#[cfg(feature = "visualize")]
pub mod visualize;
