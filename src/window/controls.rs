use opencv::highgui;

use crate::blob::hsv::HsvRange;

const TRACKBAR_MAX: i32 = 255;

const HUE_MIN: &str = "H min";
const HUE_MAX: &str = "H max";
const SAT_MIN: &str = "S min";
const SAT_MAX: &str = "S max";
const VAL_MIN: &str = "V min";
const VAL_MAX: &str = "V max";

/// A window of six trackbars editing the HSV threshold range.
pub struct ThresholdControls {
    window: String,
}

impl ThresholdControls {
    pub fn create(window: &str, initial: &HsvRange) -> opencv::Result<Self> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
        for name in [HUE_MIN, HUE_MAX, SAT_MIN, SAT_MAX, VAL_MIN, VAL_MAX] {
            highgui::create_trackbar(name, window, None, TRACKBAR_MAX, None)?;
        }
        let controls = Self {
            window: window.to_string(),
        };
        controls.set(initial)?;
        Ok(controls)
    }

    /// Current trackbar positions as a threshold range.
    pub fn read(&self) -> opencv::Result<HsvRange> {
        let pos = |name: &str| -> opencv::Result<u8> {
            Ok(highgui::get_trackbar_pos(name, &self.window)?.clamp(0, TRACKBAR_MAX) as u8)
        };
        Ok(HsvRange {
            hue_min: pos(HUE_MIN)?,
            hue_max: pos(HUE_MAX)?,
            sat_min: pos(SAT_MIN)?,
            sat_max: pos(SAT_MAX)?,
            val_min: pos(VAL_MIN)?,
            val_max: pos(VAL_MAX)?,
        })
    }

    pub fn set(&self, range: &HsvRange) -> opencv::Result<()> {
        for (name, value) in [
            (HUE_MIN, range.hue_min),
            (HUE_MAX, range.hue_max),
            (SAT_MIN, range.sat_min),
            (SAT_MAX, range.sat_max),
            (VAL_MIN, range.val_min),
            (VAL_MAX, range.val_max),
        ] {
            highgui::set_trackbar_pos(name, &self.window, value as i32)?;
        }
        Ok(())
    }
}

impl Drop for ThresholdControls {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.window) {
            log::debug!("Failed to destroy window \"{}\": {}", self.window, e);
        }
    }
}
