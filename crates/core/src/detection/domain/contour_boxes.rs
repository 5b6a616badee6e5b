use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::shared::bounding_box::BoundingBox;

/// Bounding boxes of the external contours of a binary mask.
///
/// Only outer borders without an enclosing hole count, so blobs nested
/// inside another blob's hole are ignored. Contours whose polygon area is
/// below `min_area` are dropped as noise.
pub fn external_boxes(mask: &GrayImage, min_area: f64) -> Vec<BoundingBox> {
    // The tracer starts border following from the image edge itself, which
    // mislabels blobs touching column 0. A one-pixel background frame makes
    // every blob an interior outer border.
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            c.points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect::<Vec<_>>()
        })
        .filter(|points| polygon_area(points) >= min_area)
        .filter_map(|points| BoundingBox::enclosing(&points))
        .collect()
}

/// Shoelace area of a closed polygon through the given vertices.
///
/// Vertices are pixel centers, so a filled `w`x`h` block traces an outline
/// of area `(w - 1) * (h - 1)`.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}
