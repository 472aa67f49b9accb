use std::fmt::Display;

use opencv::{
    core::{AlgorithmHint, CV_8UC3, Scalar, Vec3b},
    imgproc,
    prelude::*,
};
use serde::{Deserialize, Serialize};

/// A pixel in the full-range HSV color space.
///
/// All three channels are stored as bytes. Hue covers the whole color wheel on a 0-255 scale
/// (0 degrees maps to 0, 360 degrees would map to 256), the same convention as OpenCV's
/// `COLOR_RGB2HSV_FULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Convert a whole RGB8 image to full-range HSV (`COLOR_RGB2HSV_FULL`).
pub fn rgb_image_to_hsv(rgb: &Mat) -> opencv::Result<Mat> {
    let mut hsv = Mat::default();
    imgproc::cvt_color(
        rgb,
        &mut hsv,
        imgproc::COLOR_RGB2HSV_FULL,
        0,
        AlgorithmHint::ALGO_HINT_ACCURATE,
    )?;
    Ok(hsv)
}

/// Convert a single 8-bit RGB pixel to full-range HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> opencv::Result<Hsv> {
    let pixel = Mat::new_rows_cols_with_default(
        1,
        1,
        CV_8UC3,
        Scalar::new(r as f64, g as f64, b as f64, 0.0),
    )?;
    let hsv = rgb_image_to_hsv(&pixel)?;
    let [h, s, v] = hsv.at_2d::<Vec3b>(0, 0)?.0;
    Ok(Hsv { h, s, v })
}

/// The six inclusive HSV threshold bounds.
///
/// Callers are expected to keep `min <= max` for each channel. An inverted channel matches
/// nothing in `core::in_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsvRange {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
}

impl HsvRange {
    pub fn new(hue: (u8, u8), sat: (u8, u8), val: (u8, u8)) -> Self {
        Self {
            hue_min: hue.0,
            hue_max: hue.1,
            sat_min: sat.0,
            sat_max: sat.1,
            val_min: val.0,
            val_max: val.1,
        }
    }

    /// A range that accepts every color.
    pub fn full() -> Self {
        Self::new((0, 255), (0, 255), (0, 255))
    }

    /// The lower bounds as an `in_range` scalar.
    pub fn lower_bound(&self) -> Scalar {
        Scalar::new(
            self.hue_min as f64,
            self.sat_min as f64,
            self.val_min as f64,
            0.0,
        )
    }

    /// The upper bounds as an `in_range` scalar.
    pub fn upper_bound(&self) -> Scalar {
        Scalar::new(
            self.hue_max as f64,
            self.sat_max as f64,
            self.val_max as f64,
            0.0,
        )
    }

    /// Whether some channel has its minimum above its maximum.
    pub fn is_inverted(&self) -> bool {
        self.hue_min > self.hue_max || self.sat_min > self.sat_max || self.val_min > self.val_max
    }
}

impl Default for HsvRange {
    /// Bright, weakly saturated colors: a white table or backdrop. Anything colorful placed on
    /// it falls outside the range.
    fn default() -> Self {
        Self::new((0, 255), (0, 60), (150, 255))
    }
}

impl Display for HsvRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "H:{} - {} | S:{} - {} | V:{} - {}",
            self.hue_min, self.hue_max, self.sat_min, self.sat_max, self.val_min, self.val_max
        )
    }
}
