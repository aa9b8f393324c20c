//! Affine mapping between pixel indices and geographic coordinates.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Maps (row, col) pixel indices to geographic coordinates.
///
/// The origin is the outer corner of the top-left pixel (west, north).
/// Rows advance southward, columns eastward, so `pixel_height` is applied
/// with a negative sign when descending rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate (longitude) of the top-left corner
    pub origin_x: f64,
    /// Y coordinate (latitude) of the top-left corner
    pub origin_y: f64,
    /// Pixel width in coordinate units (positive)
    pub pixel_width: f64,
    /// Pixel height in coordinate units (positive)
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Geographic coordinate of a pixel's center.
    pub fn pixel_center(&self, row: usize, col: usize) -> Point {
        Point::new(
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }
}

impl Default for GeoTransform {
    /// Unit grid anchored at (0, 0): pixel (r, c) centers at (c + 0.5, -(r + 0.5)).
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}
