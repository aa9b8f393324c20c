//! Compositing policies over a filtered image collection.
//!
//! The policy choice is local; the arithmetic here is the reference
//! semantics the in-process engine evaluates and tests assert against:
//!
//! - **Mosaic**: per pixel and band, the value from the most-recently-added
//!   image that has a valid value there (later images win).
//! - **Median**: per pixel and band, the statistical median across valid
//!   values; the mean of the two middle values for even counts.
//! - **Mean**: per pixel and band, the arithmetic mean of valid values.
//!
//! Positions where no image has a valid value stay no-data.

use crate::raster::RasterImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while compositing.
#[derive(Debug, Error, PartialEq)]
pub enum CompositeError {
    /// No images to composite
    #[error("cannot composite an empty collection")]
    EmptyCollection,

    /// Images in the collection have differing grids
    #[error("image '{index}' is {actual_width}x{actual_height}, expected {width}x{height}")]
    ShapeMismatch {
        index: usize,
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

/// Aggregation policy applied per pixel position and band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositePolicy {
    /// First valid value by reverse collection order (later images win)
    Mosaic,
    /// Statistical median of valid values
    Median,
    /// Arithmetic mean of valid values
    Mean,
}

impl CompositePolicy {
    /// Reduces the valid values at one pixel position. `values` holds only
    /// valid samples in collection order; empty input yields no-data.
    fn reduce(&self, values: &mut Vec<f64>) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            CompositePolicy::Mosaic => values.last().copied(),
            CompositePolicy::Median => {
                values.sort_by(|a, b| a.total_cmp(b));
                let mid = values.len() / 2;
                if values.len() % 2 == 1 {
                    Some(values[mid])
                } else {
                    Some((values[mid - 1] + values[mid]) / 2.0)
                }
            }
            CompositePolicy::Mean => {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
    }
}

/// Composites a collection of images under the given policy.
///
/// All images must share the grid dimensions of the first; its geotransform
/// carries over to the result. The output band set is the union of input
/// band names in first-seen order; an image lacking a band contributes
/// nothing at its positions.
pub fn composite(
    policy: CompositePolicy,
    images: &[RasterImage],
) -> Result<RasterImage, CompositeError> {
    let first = images.first().ok_or(CompositeError::EmptyCollection)?;
    let (width, height) = (first.width(), first.height());

    for (index, image) in images.iter().enumerate() {
        if image.width() != width || image.height() != height {
            return Err(CompositeError::ShapeMismatch {
                index,
                width,
                height,
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }
    }

    // Union of band names, first-seen order.
    let mut band_names: Vec<String> = Vec::new();
    for image in images {
        for band in image.bands() {
            if !band_names.iter().any(|n| n == band.name()) {
                band_names.push(band.name().to_string());
            }
        }
    }

    debug!(
        policy = ?policy,
        images = images.len(),
        bands = band_names.len(),
        "compositing collection"
    );

    let pixel_count = width * height;
    let mut result = RasterImage::with_transform(width, height, first.transform());
    let mut samples: Vec<f64> = Vec::with_capacity(images.len());

    for name in &band_names {
        let sources: Vec<_> = images.iter().map(|img| img.band(name)).collect();
        let mut pixels = Vec::with_capacity(pixel_count);
        for idx in 0..pixel_count {
            samples.clear();
            for band in sources.iter().flatten() {
                if let Some(v) = band.pixels()[idx] {
                    samples.push(v);
                }
            }
            pixels.push(policy.reduce(&mut samples));
        }
        result
            .push_band(name.clone(), pixels)
            .expect("union band names are unique and sized to the grid");
    }

    Ok(result)
}
