use opencv::{core, prelude::*};

use crate::blob::hsv::{HsvRange, rgb_image_to_hsv};

/// Mark every pixel of an RGB8 image whose HSV value lies within all three bounds of `range`.
///
/// The result is a single-channel 8-bit mask, 255 where the pixel is in range and 0 elsewhere.
pub fn in_range_mask(rgb: &Mat, range: &HsvRange) -> opencv::Result<Mat> {
    let hsv = rgb_image_to_hsv(rgb)?;
    let mut mask = Mat::default();
    core::in_range(&hsv, &range.lower_bound(), &range.upper_bound(), &mut mask)?;
    Ok(mask)
}

/// The complement of [`in_range_mask`]: the pixels whose color lies outside `range`.
pub fn foreground_mask(rgb: &Mat, range: &HsvRange) -> opencv::Result<Mat> {
    let mut foreground = Mat::default();
    core::bitwise_not_def(&in_range_mask(rgb, range)?, &mut foreground)?;
    Ok(foreground)
}

/// Build a mask from rows of `'#'` (set) and any other byte (clear).
#[cfg(test)]
pub(crate) fn mask_from_rows(rows: &[&str]) -> Mat {
    let height = rows.len() as i32;
    let width = rows.first().map_or(0, |row| row.len()) as i32;
    let mut mask =
        Mat::new_rows_cols_with_default(height, width, core::CV_8UC1, core::Scalar::all(0.0))
            .unwrap();
    for (y, row) in rows.iter().enumerate() {
        for (x, c) in row.bytes().enumerate().take(width as usize) {
            if c == b'#' {
                *mask.at_2d_mut::<u8>(y as i32, x as i32).unwrap() = 255;
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use opencv::core::{CV_8UC1, CV_8UC3, Scalar};

    use super::*;
    use crate::blob::frame::RgbFrame;

    #[test]
    fn test_mask_from_rgb_image() {
        // red, white / white, blue
        let data = [255, 0, 0, 255, 255, 255, 255, 255, 255, 0, 0, 255];
        let rgb = RgbFrame::new(2, 2, &data).unwrap().to_mat().unwrap();
        let mask = in_range_mask(&rgb, &HsvRange::default()).unwrap();
        assert_eq!(mask.typ(), CV_8UC1);
        assert_eq!(*mask.at_2d::<u8>(0, 0).unwrap(), 0);
        assert_eq!(*mask.at_2d::<u8>(0, 1).unwrap(), 255);
        assert_eq!(*mask.at_2d::<u8>(1, 0).unwrap(), 255);
        assert_eq!(*mask.at_2d::<u8>(1, 1).unwrap(), 0);
        assert_eq!(core::count_non_zero(&mask).unwrap(), 2);
    }

    #[test]
    fn test_foreground_complements_every_pixel() {
        let rgb = Mat::new_rows_cols_with_default(3, 4, CV_8UC3, Scalar::new(200.0, 20.0, 20.0, 0.0))
            .unwrap();
        let range = HsvRange::default();
        let in_range = in_range_mask(&rgb, &range).unwrap();
        let foreground = foreground_mask(&rgb, &range).unwrap();
        assert_eq!(core::count_non_zero(&in_range).unwrap(), 0);
        assert_eq!(core::count_non_zero(&foreground).unwrap(), 12);
    }

    #[test]
    fn test_inverted_range_marks_everything_foreground() {
        let rgb = Mat::new_rows_cols_with_default(2, 2, CV_8UC3, Scalar::all(255.0)).unwrap();
        let inverted = HsvRange::new((20, 10), (0, 255), (0, 255));
        let foreground = foreground_mask(&rgb, &inverted).unwrap();
        assert_eq!(core::count_non_zero(&foreground).unwrap(), 4);
    }

    #[test]
    fn test_full_range_leaves_no_foreground() {
        let rgb = Mat::new_rows_cols_with_default(2, 5, CV_8UC3, Scalar::new(10.0, 90.0, 250.0, 0.0))
            .unwrap();
        let foreground = foreground_mask(&rgb, &HsvRange::full()).unwrap();
        assert_eq!(core::count_non_zero(&foreground).unwrap(), 0);
    }

    #[test]
    fn test_mask_from_rows() {
        let mask = mask_from_rows(&["#..", ".#.", "..#"]);
        assert_eq!((mask.rows(), mask.cols()), (3, 3));
        assert_eq!(core::count_non_zero(&mask).unwrap(), 3);
        assert_eq!(*mask.at_2d::<u8>(1, 1).unwrap(), 255);
        assert_eq!(*mask.at_2d::<u8>(0, 1).unwrap(), 0);
    }
}
