use std::error::Error;
use std::fmt::Display;

extern crate nalgebra as na;

use opencv::prelude::*;

use crate::blob::contour::{Contour, find_external_contours};
use crate::blob::frame::RgbFrame;
use crate::blob::hsv::HsvRange;
use crate::blob::mask::foreground_mask;

/// Contour extraction and the polygon type used to measure regions
pub mod contour;

/// Errors raised on malformed input frames
pub mod error;

/// Borrowed RGB frames
pub mod frame;

/// HSV conversion and threshold ranges
pub mod hsv;

/// HSV threshold masks
pub mod mask;

#[cfg(test)]
mod tests;

/// An axis-aligned rectangle in pixel coordinates.
///
/// `width` and `height` are the differences between the extreme coordinates of the region, so a
/// single pixel has a width and height of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(min: na::Point2<i32>, max: na::Point2<i32>) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Whether the rectangle covers no area. Thin horizontal or vertical regions and single
    /// pixels produce degenerate boxes.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn top_left(&self) -> na::Point2<i32> {
        na::Point2::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> na::Point2<i32> {
        na::Point2::new(self.x + self.width, self.y + self.height)
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Pick the contour with the largest area.
///
/// The first contour is the initial candidate and is only replaced by a contour with a strictly
/// greater area, so ties go to the earlier contour.
pub fn select_largest(contours: &[Contour]) -> Option<&Contour> {
    let mut contours = contours.iter();
    let first = contours.next()?;
    let (largest, _) = contours.fold((first, first.area()), |(best, best_area), contour| {
        let area = contour.area();
        if area > best_area {
            (contour, area)
        } else {
            (best, best_area)
        }
    });
    Some(largest)
}

/// Find the bounding box of the largest region of an RGB8 `Mat` whose color lies *outside*
/// `range`.
///
/// The image is thresholded in HSV, the resulting mask is inverted, and the external contours
/// of the inverted mask are measured. The box of the contour with the largest enclosed area is
/// returned, or `None` if the image is empty or the inverted mask has no set pixels.
pub fn find_in_rgb_mat(rgb: &Mat, range: &HsvRange) -> opencv::Result<Option<BoundingBox>> {
    if rgb.empty() {
        return Ok(None);
    }
    let contours = find_external_contours(&foreground_mask(rgb, range)?)?;
    Ok(select_largest(&contours).and_then(Contour::bounding_box))
}

/// Same as [`find_in_rgb_mat`], for a borrowed [`RgbFrame`].
pub fn find_largest_color_bounding_box(
    frame: &RgbFrame,
    range: &HsvRange,
) -> opencv::Result<Option<BoundingBox>> {
    if frame.is_empty() {
        return Ok(None);
    }
    find_in_rgb_mat(&frame.to_mat()?, range)
}

/// Same as [`find_largest_color_bounding_box`], for a raw row-major RGB8 buffer.
///
/// A buffer that disagrees with `width` and `height` is reported as an
/// [`InvalidFrameError`](error::InvalidFrameError).
pub fn find_in_rgb_buffer(
    width: u32,
    height: u32,
    data: &[u8],
    range: &HsvRange,
) -> Result<Option<BoundingBox>, Box<dyn Error>> {
    let frame = RgbFrame::new(width, height, data)?;
    Ok(find_largest_color_bounding_box(&frame, range)?)
}
