//! Cloud and cirrus masking from a quality-assurance bit-field band.
//!
//! Sentinel-2 encodes per-pixel quality flags in the `QA60` band: bit 10
//! marks opaque clouds, bit 11 marks cirrus. A pixel is clear only when both
//! flag bits are zero. Masking drops flagged pixels in every band and
//! rescales the remaining stored integer reflectances to unit-interval
//! physical reflectance.

use super::image::RasterImage;
use thiserror::Error;
use tracing::debug;

/// Sentinel-2 quality-assurance band name.
pub const S2_QA_BAND: &str = "QA60";

/// QA60 bit position for opaque clouds.
pub const S2_CLOUD_BIT: u8 = 10;

/// QA60 bit position for cirrus.
pub const S2_CIRRUS_BIT: u8 = 11;

/// Divisor converting stored integer reflectance to physical reflectance.
pub const REFLECTANCE_SCALE: f64 = 10_000.0;

/// Errors raised while constructing a cloud mask.
#[derive(Debug, Error, PartialEq)]
pub enum MaskError {
    /// The named quality-assurance band is absent from the image
    #[error("quality band '{band}' not found in image (bands: {available:?})")]
    InvalidBand { band: String, available: Vec<String> },
}

/// Per-pixel boolean keep-mask derived from two QA bit positions.
///
/// A pixel is clear iff both designated bits are zero. A pixel whose QA
/// value is itself missing is never clear: masking never invents values.
#[derive(Debug, Clone, PartialEq)]
pub struct BitMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitMask {
    /// Derives a keep-mask from the named QA band of an image.
    pub fn from_qa(
        image: &RasterImage,
        qa_band: &str,
        cloud_bit: u8,
        cirrus_bit: u8,
    ) -> Result<Self, MaskError> {
        let band = image.band(qa_band).ok_or_else(|| MaskError::InvalidBand {
            band: qa_band.to_string(),
            available: image.band_names().iter().map(|s| s.to_string()).collect(),
        })?;

        let cloud_mask = 1u64 << cloud_bit;
        let cirrus_mask = 1u64 << cirrus_bit;
        let bits = band
            .pixels()
            .iter()
            .map(|qa| match qa {
                Some(v) => {
                    let q = qa_bits(*v);
                    (q & cloud_mask) == 0 && (q & cirrus_mask) == 0
                }
                None => false,
            })
            .collect();

        Ok(Self {
            width: image.width(),
            height: image.height(),
            bits,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at (row, col) is clear. Out-of-range is not clear.
    pub fn is_clear(&self, row: usize, col: usize) -> bool {
        if row >= self.height || col >= self.width {
            return false;
        }
        self.bits[row * self.width + col]
    }

    /// Flat per-pixel keep flags in row-major order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of clear pixels.
    pub fn clear_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

/// Interprets a QA pixel value as its integer bit pattern.
///
/// QA bands store small non-negative integers; values outside that encoding
/// are still masked by their represented bits rather than rejected.
fn qa_bits(value: f64) -> u64 {
    value as i64 as u64
}

/// Masks cloudy and cirrus pixels and rescales reflectance.
///
/// Builds the keep-mask `(qa & (1 << cloud_bit)) == 0 && (qa & (1 << cirrus_bit)) == 0`
/// from the named QA band, turns every masked-out pixel into no-data in
/// every band, and divides every retained value by [`REFLECTANCE_SCALE`].
/// Returns a new image; the input is not mutated.
///
/// # Errors
///
/// [`MaskError::InvalidBand`] if `qa_band` is absent from the image.
pub fn mask_clouds(
    image: &RasterImage,
    qa_band: &str,
    cloud_bit: u8,
    cirrus_bit: u8,
) -> Result<RasterImage, MaskError> {
    let mask = BitMask::from_qa(image, qa_band, cloud_bit, cirrus_bit)?;
    debug!(
        qa_band,
        cloud_bit,
        cirrus_bit,
        clear = mask.clear_count(),
        total = image.pixel_count(),
        "applying cloud mask"
    );

    let mut masked = RasterImage::with_transform(image.width(), image.height(), image.transform());
    for band in image.bands() {
        let pixels = band
            .pixels()
            .iter()
            .zip(mask.bits())
            .map(|(v, clear)| match (v, clear) {
                (Some(value), true) => Some(value / REFLECTANCE_SCALE),
                _ => None,
            })
            .collect();
        // Band names and lengths come from a valid image, so re-insertion
        // cannot fail.
        masked
            .push_band(band.name(), pixels)
            .expect("bands of a valid image stay valid");
    }
    Ok(masked)
}

/// [`mask_clouds`] with the Sentinel-2 QA60 conventions (bits 10 and 11).
pub fn mask_s2_clouds(image: &RasterImage) -> Result<RasterImage, MaskError> {
    mask_clouds(image, S2_QA_BAND, S2_CLOUD_BIT, S2_CIRRUS_BIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 image: one reflectance band plus QA60.
    fn sample_image(qa: [Option<f64>; 4]) -> RasterImage {
        RasterImage::new(2, 2)
            .with_band("B4", vec![Some(1500.0), Some(2500.0), Some(3500.0), None])
            .unwrap()
            .with_band(S2_QA_BAND, qa.to_vec())
            .unwrap()
    }

    const CLOUD: f64 = (1u64 << 10) as f64;
    const CIRRUS: f64 = (1u64 << 11) as f64;

    #[test]
    fn test_retains_iff_both_bits_clear() {
        // Exhaustive over the two flag bits for a range of surrounding
        // bit patterns.
        for extra in [0u64, 1, 0b1111, 1 << 5, 1 << 12] {
            for cloud in [false, true] {
                for cirrus in [false, true] {
                    let mut q = extra;
                    if cloud {
                        q |= 1 << 10;
                    }
                    if cirrus {
                        q |= 1 << 11;
                    }
                    let img = RasterImage::new(1, 1)
                        .with_band("B4", vec![Some(1000.0)])
                        .unwrap()
                        .with_band(S2_QA_BAND, vec![Some(q as f64)])
                        .unwrap();
                    let masked = mask_s2_clouds(&img).unwrap();
                    let expected_clear = !cloud && !cirrus;
                    assert_eq!(
                        masked.value("B4", 0, 0).is_some(),
                        expected_clear,
                        "qa value {:#b}",
                        q
                    );
                }
            }
        }
    }

    #[test]
    fn test_retained_values_rescaled_exactly() {
        let img = sample_image([Some(0.0), Some(0.0), Some(0.0), Some(0.0)]);
        let masked = mask_s2_clouds(&img).unwrap();
        assert_eq!(masked.value("B4", 0, 0), Some(0.15));
        assert_eq!(masked.value("B4", 0, 1), Some(0.25));
        assert_eq!(masked.value("B4", 1, 0), Some(0.35));
    }

    #[test]
    fn test_cloudy_pixels_become_no_data_in_all_bands() {
        let img = sample_image([Some(CLOUD), Some(CIRRUS), Some(CLOUD + CIRRUS), Some(0.0)]);
        let masked = mask_s2_clouds(&img).unwrap();
        assert_eq!(masked.value("B4", 0, 0), None);
        assert_eq!(masked.value("B4", 0, 1), None);
        assert_eq!(masked.value("B4", 1, 0), None);
        // QA band itself is masked and rescaled like any other band
        assert_eq!(masked.value(S2_QA_BAND, 0, 0), None);
        assert_eq!(masked.value(S2_QA_BAND, 1, 1), Some(0.0));
    }

    #[test]
    fn test_missing_qa_pixel_propagates_no_data() {
        let img = sample_image([None, Some(0.0), Some(0.0), Some(0.0)]);
        let masked = mask_s2_clouds(&img).unwrap();
        assert_eq!(masked.value("B4", 0, 0), None);
        assert_eq!(masked.value("B4", 0, 1), Some(0.25));
    }

    #[test]
    fn test_no_data_input_stays_no_data() {
        // B4 at (1,1) is already no-data; a clear QA pixel must not invent
        // a value for it.
        let img = sample_image([Some(0.0); 4]);
        let masked = mask_s2_clouds(&img).unwrap();
        assert_eq!(masked.value("B4", 1, 1), None);
    }

    #[test]
    fn test_masking_is_idempotent_on_no_data() {
        let img = sample_image([Some(CLOUD), Some(0.0), Some(0.0), Some(0.0)]);
        let once = mask_s2_clouds(&img).unwrap();
        let twice = mask_s2_clouds(&once).unwrap();
        // Pixel (0,0) was masked out the first time, QA there is now
        // no-data, so it stays no-data.
        assert_eq!(twice.value("B4", 0, 0), None);
        assert_eq!(twice.value(S2_QA_BAND, 0, 0), None);
    }

    #[test]
    fn test_input_image_not_mutated() {
        let img = sample_image([Some(CLOUD), Some(0.0), Some(0.0), Some(0.0)]);
        let _ = mask_s2_clouds(&img).unwrap();
        assert_eq!(img.value("B4", 0, 0), Some(1500.0));
        assert_eq!(img.value(S2_QA_BAND, 0, 0), Some(CLOUD));
    }

    #[test]
    fn test_missing_qa_band_fails() {
        let img = RasterImage::new(1, 1)
            .with_band("B4", vec![Some(1.0)])
            .unwrap();
        let err = mask_s2_clouds(&img).unwrap_err();
        assert_eq!(
            err,
            MaskError::InvalidBand {
                band: S2_QA_BAND.to_string(),
                available: vec!["B4".to_string()],
            }
        );
    }

    #[test]
    fn test_custom_bit_positions() {
        // Flags on bits 0 and 1 instead of the Sentinel-2 defaults.
        let img = RasterImage::new(2, 1)
            .with_band("B2", vec![Some(100.0), Some(200.0)])
            .unwrap()
            .with_band("QA", vec![Some(0b01 as f64), Some(0b100 as f64)])
            .unwrap();
        let masked = mask_clouds(&img, "QA", 0, 1).unwrap();
        assert_eq!(masked.value("B2", 0, 0), None);
        assert_eq!(masked.value("B2", 0, 1), Some(0.02));
    }

    #[test]
    fn test_bitmask_from_qa_counts() {
        let img = sample_image([Some(0.0), Some(CLOUD), None, Some(0.0)]);
        let mask = BitMask::from_qa(&img, S2_QA_BAND, S2_CLOUD_BIT, S2_CIRRUS_BIT).unwrap();
        assert_eq!(mask.clear_count(), 2);
        assert!(mask.is_clear(0, 0));
        assert!(!mask.is_clear(0, 1));
        assert!(!mask.is_clear(1, 0));
        assert!(mask.is_clear(1, 1));
        assert!(!mask.is_clear(5, 5));
    }
}
