//! Raster image model and the cloud-masking transform.
//!
//! A [`RasterImage`] is a multi-band 2D grid of optional reflectance values.
//! `None` is the "no data" marker: it propagates through every transform and
//! is never replaced by a computed value. Images are pure values; transforms
//! return new images and leave their input untouched.

mod geotransform;
mod image;
mod mask;

pub use geotransform::GeoTransform;
pub use image::{Band, RasterError, RasterImage};
pub use mask::{
    mask_clouds, mask_s2_clouds, BitMask, MaskError, REFLECTANCE_SCALE, S2_CIRRUS_BIT,
    S2_CLOUD_BIT, S2_QA_BAND,
};
