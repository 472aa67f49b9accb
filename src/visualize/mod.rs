use opencv::{
    core::{self, Rect, Scalar},
    highgui, imgproc,
    prelude::*,
};

use crate::blob::BoundingBox;

pub const MASK_WINDOW: &str = "~mask";
pub const MASKED_IMAGE_WINDOW: &str = "res";
pub const ANNOTATED_WINDOW: &str = "Extract the Contours";

/// Show the intermediate images of one detection: the inverted mask that contours are traced
/// on, the frame restricted to the in-range pixels, and the frame with the detected box.
pub fn show_debug_windows(
    frame_bgr: &Mat,
    in_range_mask: &Mat,
    bbox: Option<BoundingBox>,
) -> opencv::Result<()> {
    if frame_bgr.empty() || in_range_mask.empty() {
        return Ok(());
    }
    let mut inverted = Mat::default();
    core::bitwise_not_def(in_range_mask, &mut inverted)?;
    highgui::imshow(MASK_WINDOW, &inverted)?;

    let mut masked = Mat::default();
    core::bitwise_and(frame_bgr, frame_bgr, &mut masked, in_range_mask)?;
    highgui::imshow(MASKED_IMAGE_WINDOW, &masked)?;

    if let Some(bbox) = bbox.filter(|b| !b.is_degenerate()) {
        let mut annotated = frame_bgr.try_clone()?;
        imgproc::rectangle(
            &mut annotated,
            Rect::new(bbox.x, bbox.y, bbox.width, bbox.height),
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            2,
            imgproc::LINE_8,
            0,
        )?;
        highgui::imshow(ANNOTATED_WINDOW, &annotated)?;
    }
    Ok(())
}
