//! Multi-band raster image type.

use super::GeoTransform;
use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a raster image.
#[derive(Debug, Error, PartialEq)]
pub enum RasterError {
    /// Band pixel buffer does not match the image dimensions
    #[error("band '{band}' has {actual} pixels, image expects {expected}")]
    DimensionMismatch {
        band: String,
        expected: usize,
        actual: usize,
    },

    /// A band with this name already exists on the image
    #[error("band '{band}' already present")]
    DuplicateBand { band: String },
}

/// A single named band: a row-major grid of optional values.
///
/// `None` is the "no data" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    name: String,
    pixels: Vec<Option<f64>>,
}

impl Band {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixels(&self) -> &[Option<f64>] {
        &self.pixels
    }
}

/// A multi-band 2D grid of reflectance values with geographic placement.
///
/// Band order is preserved as inserted. All bands share the image
/// dimensions; per-band grids of differing size are rejected at insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    width: usize,
    height: usize,
    transform: GeoTransform,
    bands: Vec<Band>,
}

impl RasterImage {
    /// Creates an empty image (no bands) with the default unit transform.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_transform(width, height, GeoTransform::default())
    }

    /// Creates an empty image with an explicit geotransform.
    pub fn with_transform(width: usize, height: usize, transform: GeoTransform) -> Self {
        Self {
            width,
            height,
            transform,
            bands: Vec::new(),
        }
    }

    /// Adds a band, consuming and returning the image for chaining.
    pub fn with_band(
        mut self,
        name: impl Into<String>,
        pixels: Vec<Option<f64>>,
    ) -> Result<Self, RasterError> {
        self.push_band(name, pixels)?;
        Ok(self)
    }

    /// Adds a band in place.
    pub fn push_band(
        &mut self,
        name: impl Into<String>,
        pixels: Vec<Option<f64>>,
    ) -> Result<(), RasterError> {
        let name = name.into();
        let expected = self.width * self.height;
        if pixels.len() != expected {
            return Err(RasterError::DimensionMismatch {
                band: name,
                expected,
                actual: pixels.len(),
            });
        }
        if self.band(&name).is_some() {
            return Err(RasterError::DuplicateBand { band: name });
        }
        self.bands.push(Band { name, pixels });
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels per band.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    /// Bands in insertion order.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Band names in insertion order.
    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    /// Looks up a band by name.
    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }

    /// Value of a band at (row, col); `None` for no-data or out-of-range
    /// lookups.
    pub fn value(&self, band: &str, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.band(band)?.pixels[row * self.width + col]
    }

    /// Returns a new image keeping only the bands whose names satisfy the
    /// predicate. Band order is preserved.
    pub fn select_bands(&self, keep: impl Fn(&str) -> bool) -> RasterImage {
        RasterImage {
            width: self.width,
            height: self.height,
            transform: self.transform,
            bands: self
                .bands
                .iter()
                .filter(|b| keep(&b.name))
                .cloned()
                .collect(),
        }
    }

    /// Returns a new image where pixels whose centers fall outside the
    /// geometry become no-data in every band. The input is not modified.
    pub fn clip(&self, geometry: &Geometry) -> RasterImage {
        let mut inside = vec![false; self.pixel_count()];
        for row in 0..self.height {
            for col in 0..self.width {
                let center = self.transform.pixel_center(row, col);
                inside[row * self.width + col] = geometry.contains_point(center);
            }
        }

        let bands = self
            .bands
            .iter()
            .map(|b| Band {
                name: b.name.clone(),
                pixels: b
                    .pixels
                    .iter()
                    .zip(&inside)
                    .map(|(v, keep)| if *keep { *v } else { None })
                    .collect(),
            })
            .collect();

        RasterImage {
            width: self.width,
            height: self.height,
            transform: self.transform,
            bands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;

    fn two_by_two(name: &str, values: [Option<f64>; 4]) -> RasterImage {
        RasterImage::new(2, 2).with_band(name, values.to_vec()).unwrap()
    }

    #[test]
    fn test_with_band_and_lookup() {
        let img = two_by_two("B4", [Some(1.0), Some(2.0), None, Some(4.0)]);
        assert_eq!(img.value("B4", 0, 0), Some(1.0));
        assert_eq!(img.value("B4", 0, 1), Some(2.0));
        assert_eq!(img.value("B4", 1, 0), None);
        assert_eq!(img.value("B4", 1, 1), Some(4.0));
    }

    #[test]
    fn test_value_out_of_range_is_none() {
        let img = two_by_two("B4", [Some(1.0); 4]);
        assert_eq!(img.value("B4", 2, 0), None);
        assert_eq!(img.value("B4", 0, 2), None);
        assert_eq!(img.value("B9", 0, 0), None);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = RasterImage::new(2, 2)
            .with_band("B4", vec![Some(1.0); 3])
            .unwrap_err();
        assert_eq!(
            err,
            RasterError::DimensionMismatch {
                band: "B4".to_string(),
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_duplicate_band_rejected() {
        let err = two_by_two("B4", [Some(1.0); 4])
            .with_band("B4", vec![Some(2.0); 4])
            .unwrap_err();
        assert_eq!(
            err,
            RasterError::DuplicateBand {
                band: "B4".to_string()
            }
        );
    }

    #[test]
    fn test_band_order_preserved() {
        let img = RasterImage::new(1, 1)
            .with_band("B4", vec![Some(1.0)])
            .unwrap()
            .with_band("B3", vec![Some(2.0)])
            .unwrap()
            .with_band("B2", vec![Some(3.0)])
            .unwrap();
        assert_eq!(img.band_names(), vec!["B4", "B3", "B2"]);
    }

    #[test]
    fn test_select_bands_keeps_matching_only() {
        let img = RasterImage::new(1, 1)
            .with_band("B4", vec![Some(1.0)])
            .unwrap()
            .with_band("QA60", vec![Some(0.0)])
            .unwrap();
        let selected = img.select_bands(|name| name.starts_with('B'));
        assert_eq!(selected.band_names(), vec!["B4"]);
        assert_eq!(selected.value("B4", 0, 0), Some(1.0));
    }

    #[test]
    fn test_clip_masks_pixels_outside_geometry() {
        // Default transform: 2x2 pixel centers at (0.5,-0.5) (1.5,-0.5)
        // (0.5,-1.5) (1.5,-1.5). Clip to the left column.
        let img = two_by_two("B4", [Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let region = Geometry::Polygon(Polygon::rect(0.0, -2.0, 1.0, 0.0));
        let clipped = img.clip(&region);

        assert_eq!(clipped.value("B4", 0, 0), Some(1.0));
        assert_eq!(clipped.value("B4", 0, 1), None);
        assert_eq!(clipped.value("B4", 1, 0), Some(3.0));
        assert_eq!(clipped.value("B4", 1, 1), None);

        // Source image untouched
        assert_eq!(img.value("B4", 0, 1), Some(2.0));
    }

    #[test]
    fn test_clip_never_invents_values() {
        let img = two_by_two("B4", [None, Some(2.0), None, Some(4.0)]);
        let region = Geometry::Polygon(Polygon::rect(-10.0, -10.0, 10.0, 10.0));
        let clipped = img.clip(&region);
        assert_eq!(clipped.value("B4", 0, 0), None);
        assert_eq!(clipped.value("B4", 0, 1), Some(2.0));
    }
}
