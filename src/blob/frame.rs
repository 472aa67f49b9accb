use opencv::{
    core::{CV_8UC3, Scalar, StsOutOfRange},
    prelude::*,
};

use crate::blob::error::InvalidFrameError;

/// Number of bytes per RGB8 pixel.
pub const CHANNELS: usize = 3;

/// Buffer length of a `width` x `height` RGB8 frame, or `None` if it does not fit in `usize`.
pub fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// A read-only view into a row-major RGB8 frame.
///
/// The view borrows the caller's pixel buffer for the duration of a single computation. Pixels
/// are stored as consecutive `[r, g, b]` triples, row after row.
#[derive(Debug, Clone, Copy)]
pub struct RgbFrame<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> RgbFrame<'a> {
    /// Wrap a pixel buffer as a frame.
    ///
    /// A frame with a zero dimension and an empty buffer is accepted and treated as empty. Any
    /// other disagreement between the dimensions and the buffer length is rejected.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, InvalidFrameError> {
        let Some(expected) = expected_len(width, height) else {
            return Err(InvalidFrameError::new(
                width,
                height,
                data.len(),
                "frame dimensions overflow",
            ));
        };
        if data.len() != expected {
            let reason = if data.is_empty() {
                "pixel buffer is empty"
            } else {
                "pixel buffer length must equal width * height * 3"
            };
            return Err(InvalidFrameError::new(width, height, data.len(), reason));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// An empty frame with no pixels.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: &[],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Copy the pixels into an 8-bit, 3-channel `Mat` in RGB order.
    pub fn to_mat(&self) -> opencv::Result<Mat> {
        let rows = cv_dimension(self.height)?;
        let cols = cv_dimension(self.width)?;
        let mut mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0))?;
        mat.data_bytes_mut()?.copy_from_slice(self.data);
        Ok(mat)
    }
}

fn cv_dimension(value: u32) -> opencv::Result<i32> {
    i32::try_from(value).map_err(|_| {
        opencv::Error::new(
            StsOutOfRange,
            format!("frame dimension {} is too large for an OpenCV matrix", value),
        )
    })
}

#[cfg(test)]
mod tests {
    use opencv::core::Vec3b;

    use super::*;

    #[test]
    fn test_frame_rejects_mismatched_buffer() {
        let data = vec![0u8; 10];
        let err = RgbFrame::new(2, 2, &data).unwrap_err();
        assert_eq!(err.width(), 2);
        assert_eq!(err.height(), 2);
        assert_eq!(err.buffer_len(), 10);
    }

    #[test]
    fn test_frame_rejects_missing_buffer() {
        assert!(RgbFrame::new(4, 3, &[]).is_err());
    }

    #[test]
    fn test_huge_dimensions_are_rejected() {
        let err = RgbFrame::new(u32::MAX, u32::MAX, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.buffer_len(), 3);
        // formatting must not overflow either
        assert!(err.to_string().contains("frame dimensions overflow"));
    }

    #[test]
    fn test_zero_sized_frame_is_empty() {
        let frame = RgbFrame::new(0, 7, &[]).unwrap();
        assert!(frame.is_empty());
        assert!(RgbFrame::empty().is_empty());
    }

    #[test]
    fn test_to_mat_keeps_row_major_pixels() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let frame = RgbFrame::new(2, 2, &data).unwrap();
        let mat = frame.to_mat().unwrap();
        assert_eq!(mat.typ(), CV_8UC3);
        assert_eq!((mat.rows(), mat.cols()), (2, 2));
        assert_eq!(mat.at_2d::<Vec3b>(0, 1).unwrap().0, [4, 5, 6]);
        assert_eq!(mat.at_2d::<Vec3b>(1, 0).unwrap().0, [7, 8, 9]);
    }
}
