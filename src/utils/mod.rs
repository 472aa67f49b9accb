use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone};

/// Weight of the newest frame interval in the smoothed frame rate.
const FPS_SMOOTHING: f64 = 0.1;

/// Measures the display's frames per second with exponential smoothing.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    last_frame: Option<Instant>,
    fps: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame presented at `now` and return the updated frame rate.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(last) = self.last_frame {
            let elapsed = now.saturating_duration_since(last);
            if elapsed > Duration::ZERO {
                let instant_fps = 1.0 / elapsed.as_secs_f64();
                self.fps = if self.fps == 0.0 {
                    instant_fps
                } else {
                    self.fps * (1.0 - FPS_SMOOTHING) + instant_fps * FPS_SMOOTHING
                };
            }
        }
        self.last_frame = Some(now);
        self.fps
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Build a file name such as `capture-20250101-120000-042.jpg` inside `dir`.
pub fn timestamped_path<Tz: TimeZone>(dir: &Path, prefix: &str, extension: &str, time: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!(
        "{}-{}.{}",
        prefix,
        time.format("%Y%m%d-%H%M%S-%3f"),
        extension
    ))
}
