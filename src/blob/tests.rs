extern crate nalgebra as na;

use opencv::prelude::*;
use rand::Rng;

use crate::blob::error::InvalidFrameError;
use crate::blob::hsv::rgb_to_hsv;

use super::*;

const WHITE: [u8; 3] = [255, 255, 255];
const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];

fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    (0..width * height).flat_map(|_| color).collect()
}

fn paint_rect(data: &mut [u8], frame_width: u32, (x, y, w, h): (u32, u32, u32, u32), color: [u8; 3]) {
    for row in y..y + h {
        for col in x..x + w {
            let i = ((row * frame_width + col) * 3) as usize;
            data[i..i + 3].copy_from_slice(&color);
        }
    }
}

fn detect(width: u32, height: u32, data: &[u8], range: &HsvRange) -> Option<BoundingBox> {
    let frame = RgbFrame::new(width, height, data).unwrap();
    find_largest_color_bounding_box(&frame, range).unwrap()
}

#[test]
fn test_no_foreground_returns_none() {
    let data = solid_frame(32, 24, WHITE);
    assert_eq!(detect(32, 24, &data, &HsvRange::default()), None);
}

#[test]
fn test_empty_frame_returns_none() {
    assert_eq!(
        find_largest_color_bounding_box(&RgbFrame::empty(), &HsvRange::default()).unwrap(),
        None
    );
    assert_eq!(find_in_rgb_buffer(0, 0, &[], &HsvRange::default()).unwrap(), None);
    assert_eq!(find_in_rgb_mat(&Mat::default(), &HsvRange::default()).unwrap(), None);
}

#[test]
fn test_mismatched_buffer_is_rejected() {
    let data = solid_frame(4, 4, WHITE);
    let err = find_in_rgb_buffer(5, 4, &data, &HsvRange::default()).unwrap_err();
    let err = err.downcast_ref::<InvalidFrameError>().unwrap();
    assert_eq!(err.buffer_len(), data.len());
}

#[test]
fn test_overflowing_dimensions_are_rejected() {
    let err = find_in_rgb_buffer(u32::MAX, u32::MAX, &[1, 2, 3], &HsvRange::default())
        .unwrap_err();
    assert!(err.downcast_ref::<InvalidFrameError>().is_some());
}

#[test]
fn test_single_rectangle_extent() {
    let mut data = solid_frame(64, 48, WHITE);
    paint_rect(&mut data, 64, (12, 7, 20, 5), RED);
    assert_eq!(
        detect(64, 48, &data, &HsvRange::default()),
        Some(BoundingBox::new(12, 7, 19, 4))
    );
}

#[test]
fn test_square_on_colored_background() {
    let background = [64, 128, 64];
    let hsv = rgb_to_hsv(background[0], background[1], background[2]).unwrap();
    let range = HsvRange::new(
        (hsv.h - 5, hsv.h + 5),
        (hsv.s - 8, hsv.s + 8),
        (hsv.v - 8, hsv.v + 8),
    );

    let mut data = solid_frame(100, 100, background);
    paint_rect(&mut data, 100, (40, 40, 10, 10), RED);
    assert_eq!(
        detect(100, 100, &data, &range),
        Some(BoundingBox::new(40, 40, 9, 9))
    );
}

#[test]
fn test_in_range_color_is_not_the_foreground() {
    // the detector finds what does not match the range: a red square on a blue background,
    // with a range selecting red, reports the blue surroundings
    let mut data = solid_frame(30, 20, BLUE);
    paint_rect(&mut data, 30, (5, 5, 4, 4), RED);
    let red_only = HsvRange::new((0, 5), (200, 255), (200, 255));
    assert_eq!(
        detect(30, 20, &data, &red_only),
        Some(BoundingBox::new(0, 0, 29, 19))
    );
}

#[test]
fn test_larger_region_wins_in_either_order() {
    let mut first_small = solid_frame(80, 60, WHITE);
    paint_rect(&mut first_small, 80, (2, 2, 4, 4), RED);
    paint_rect(&mut first_small, 80, (30, 30, 12, 9), BLUE);
    assert_eq!(
        detect(80, 60, &first_small, &HsvRange::default()),
        Some(BoundingBox::new(30, 30, 11, 8))
    );

    let mut first_large = solid_frame(80, 60, WHITE);
    paint_rect(&mut first_large, 80, (2, 2, 12, 9), BLUE);
    paint_rect(&mut first_large, 80, (50, 40, 4, 4), RED);
    assert_eq!(
        detect(80, 60, &first_large, &HsvRange::default()),
        Some(BoundingBox::new(2, 2, 11, 8))
    );
}

#[test]
fn test_equal_areas_resolve_to_raster_order() {
    let mut data = solid_frame(40, 40, WHITE);
    // the lower square starts further left, but the upper one is reached first
    paint_rect(&mut data, 40, (25, 3, 6, 6), RED);
    paint_rect(&mut data, 40, (2, 20, 6, 6), BLUE);
    assert_eq!(
        detect(40, 40, &data, &HsvRange::default()),
        Some(BoundingBox::new(25, 3, 5, 5))
    );
}

#[test]
fn test_single_pixel_region() {
    let mut data = solid_frame(10, 10, WHITE);
    paint_rect(&mut data, 10, (7, 3, 1, 1), RED);
    let bbox = detect(10, 10, &data, &HsvRange::default()).unwrap();
    assert_eq!(bbox, BoundingBox::new(7, 3, 0, 0));
    assert!(bbox.is_degenerate());
}

#[test]
fn test_zero_area_regions_pick_the_first() {
    let mut data = solid_frame(10, 10, WHITE);
    paint_rect(&mut data, 10, (1, 1, 1, 1), RED);
    paint_rect(&mut data, 10, (5, 5, 3, 1), RED);
    assert_eq!(
        detect(10, 10, &data, &HsvRange::default()),
        Some(BoundingBox::new(1, 1, 0, 0))
    );
}

#[test]
fn test_region_inside_hole_is_ignored() {
    let mut data = solid_frame(50, 50, WHITE);
    paint_rect(&mut data, 50, (10, 10, 20, 20), RED);
    paint_rect(&mut data, 50, (12, 12, 16, 16), WHITE);
    paint_rect(&mut data, 50, (15, 15, 10, 10), BLUE);
    assert_eq!(
        detect(50, 50, &data, &HsvRange::default()),
        Some(BoundingBox::new(10, 10, 19, 19))
    );
}

#[test]
fn test_select_largest_keeps_first_on_tie() {
    let square = |x: i32| {
        Contour::new(vec![
            na::Point2::new(x, 0),
            na::Point2::new(x, 2),
            na::Point2::new(x + 2, 2),
            na::Point2::new(x + 2, 0),
        ])
    };
    let contours = vec![square(0).unwrap(), square(10).unwrap(), square(20).unwrap()];
    assert_eq!(select_largest(&contours), Some(&contours[0]));
    assert_eq!(select_largest(&[]), None);
}

#[test]
fn test_random_frames_are_idempotent() {
    let mut rng = rand::rng();
    for _ in 0..20 {
        let width = rng.random_range(1..40);
        let height = rng.random_range(1..40);
        let data = (0..width * height * 3)
            .map(|_| if rng.random_bool(0.7) { 255 } else { 0 })
            .collect::<Vec<u8>>();
        let range = HsvRange::default();
        let first = detect(width, height, &data, &range);
        let second = detect(width, height, &data, &range);
        assert_eq!(first, second);
    }
}

#[test]
fn test_random_pairs_pick_larger_square() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        let small = rng.random_range(1..8);
        let large = rng.random_range(small + 2..16);
        let (large_x, small_x) = if rng.random_bool(0.5) { (2, 30) } else { (30, 2) };
        let large_y = rng.random_range(0..20);
        let small_y = rng.random_range(0..20);

        let mut data = solid_frame(50, 40, WHITE);
        paint_rect(&mut data, 50, (large_x, large_y, large, large), RED);
        paint_rect(&mut data, 50, (small_x, small_y, small, small), BLUE);
        assert_eq!(
            detect(50, 40, &data, &HsvRange::default()),
            Some(BoundingBox::new(
                large_x as i32,
                large_y as i32,
                large as i32 - 1,
                large as i32 - 1
            ))
        );
    }
}
