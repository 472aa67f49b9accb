extern crate nalgebra as na;

use opencv::{
    core::{Point, Vector},
    imgproc,
    prelude::*,
};

use crate::blob::BoundingBox;

/// The ordered boundary of a region, stored as a closed polygon whose vertices are pixel
/// coordinates. The enclosed area is measured once, when the contour is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<na::Point2<i32>>,
    area: f64,
}

impl Contour {
    pub fn new(points: Vec<na::Point2<i32>>) -> opencv::Result<Self> {
        let vector = points
            .iter()
            .map(|p| Point::new(p.x, p.y))
            .collect::<Vector<Point>>();
        let area = polygon_area(&vector)?;
        Ok(Self { points, area })
    }

    /// Wrap a polygon returned by `imgproc::find_contours`.
    pub fn from_vector(vector: &Vector<Point>) -> opencv::Result<Self> {
        let area = polygon_area(vector)?;
        let points = vector.iter().map(|p| na::Point2::new(p.x, p.y)).collect();
        Ok(Self { points, area })
    }

    pub fn points(&self) -> &[na::Point2<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area of the polygon, regardless of its orientation.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// The component-wise minimum and maximum over all vertices.
    pub fn extent(&self) -> Option<(na::Point2<i32>, na::Point2<i32>)> {
        let first = *self.points.first()?;
        Some(self.points[1..].iter().fold((first, first), |(min, max), p| {
            (
                na::Point2::new(min.x.min(p.x), min.y.min(p.y)),
                na::Point2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }

    /// Axis-aligned bounding box spanning `extent()`.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let (min, max) = self.extent()?;
        Some(BoundingBox::from_corners(min, max))
    }

    /// The topmost vertex, leftmost among ties. For a traced region this is the first pixel of
    /// the region in raster order.
    fn raster_origin(&self) -> Option<(i32, i32)> {
        self.points.iter().map(|p| (p.y, p.x)).min()
    }
}

fn polygon_area(vector: &Vector<Point>) -> opencv::Result<f64> {
    // points and segments enclose nothing
    if vector.len() < 3 {
        return Ok(0.0);
    }
    imgproc::contour_area(vector, false)
}

/// Trace the outer border of every 8-connected region of set pixels in an 8-bit mask.
///
/// Borders are compressed to their corner points (`CHAIN_APPROX_SIMPLE`), and regions nested
/// inside the holes of other regions are skipped (`RETR_EXTERNAL`). Contours are ordered by the
/// raster position of each region's first pixel: top to bottom, then left to right.
pub fn find_external_contours(mask: &Mat) -> opencv::Result<Vec<Contour>> {
    if mask.empty() {
        return Ok(Vec::new());
    }
    let mut traced = Vector::<Vector<Point>>::new();
    imgproc::find_contours(
        mask,
        &mut traced,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;
    let mut contours = traced
        .iter()
        .map(|vector| Contour::from_vector(&vector))
        .collect::<opencv::Result<Vec<_>>>()?;
    contours.sort_by_key(Contour::raster_origin);
    Ok(contours)
}
