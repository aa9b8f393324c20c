//! Export request construction.
//!
//! An [`ExportSpec`] is a validated, immutable description of an export:
//! the image expression, a destination, the region to render, the sample
//! spacing and a pixel cap. Validation happens entirely at build time —
//! a malformed request never reaches the remote service. Submission is a
//! fire-and-forget side effect owned by whichever engine receives the spec.

use crate::expr::ImageExpr;
use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building an export request.
#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    /// Region, scale or pixel cap is malformed
    #[error("invalid export spec: {reason}")]
    InvalidExportSpec { reason: String },
}

impl ExportError {
    fn invalid(reason: impl Into<String>) -> Self {
        ExportError::InvalidExportSpec {
            reason: reason.into(),
        }
    }
}

/// Where the rendered file lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportDestination {
    /// A folder in the user's drive storage
    Drive { folder: String },
    /// A path in the platform's asset store
    Asset { path: String },
}

impl ExportDestination {
    /// Parses a destination descriptor of the form `drive:<folder>` or
    /// `asset:<path>`.
    pub fn parse(descriptor: &str) -> Result<Self, ExportError> {
        match descriptor.split_once(':') {
            Some(("drive", folder)) if !folder.is_empty() => Ok(ExportDestination::Drive {
                folder: folder.to_string(),
            }),
            Some(("asset", path)) if !path.is_empty() => Ok(ExportDestination::Asset {
                path: path.to_string(),
            }),
            _ => Err(ExportError::invalid(format!(
                "unrecognized destination '{}' (expected drive:<folder> or asset:<path>)",
                descriptor
            ))),
        }
    }
}

/// A validated export request. Created once, consumed once, never mutated
/// after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpec {
    image: ImageExpr,
    description: String,
    file_name_prefix: String,
    destination: ExportDestination,
    region: Geometry,
    scale: f64,
    max_pixels: u64,
}

impl ExportSpec {
    pub fn image(&self) -> &ImageExpr {
        &self.image
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn file_name_prefix(&self) -> &str {
        &self.file_name_prefix
    }

    pub fn destination(&self) -> &ExportDestination {
        &self.destination
    }

    pub fn region(&self) -> &Geometry {
        &self.region
    }

    /// Sample spacing in meters per pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Upper bound on rendered pixels.
    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }
}

/// Builder for [`ExportSpec`].
///
/// ```
/// use skysift::expr::CollectionExpr;
/// use skysift::export::ExportRequest;
/// use skysift::geometry::{Geometry, Polygon};
///
/// let image = CollectionExpr::load("COPERNICUS/S2").median();
/// let region = Geometry::Polygon(Polygon::rect(-117.5, 46.5, -117.0, 47.0));
/// let spec = ExportRequest::new(image, "WA_Composite_Raw")
///     .to_drive("earthengine")
///     .file_name_prefix("WA_composite_raw")
///     .region(region)
///     .scale(10.0)
///     .max_pixels(1_000_000_000)
///     .build()
///     .unwrap();
/// assert_eq!(spec.scale(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct ExportRequest {
    image: ImageExpr,
    description: String,
    file_name_prefix: Option<String>,
    destination: Option<ExportDestination>,
    region: Option<Geometry>,
    scale: f64,
    max_pixels: u64,
}

/// Default pixel cap, matching the hosted platform's export default.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

impl ExportRequest {
    /// Starts a request for an image expression with a task description.
    pub fn new(image: ImageExpr, description: impl Into<String>) -> Self {
        Self {
            image,
            description: description.into(),
            file_name_prefix: None,
            destination: None,
            region: None,
            scale: 1000.0,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Exports to a drive folder.
    pub fn to_drive(mut self, folder: impl Into<String>) -> Self {
        self.destination = Some(ExportDestination::Drive {
            folder: folder.into(),
        });
        self
    }

    /// Exports to an asset path.
    pub fn to_asset(mut self, path: impl Into<String>) -> Self {
        self.destination = Some(ExportDestination::Asset { path: path.into() });
        self
    }

    /// Output file name prefix. Defaults to the description.
    pub fn file_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_name_prefix = Some(prefix.into());
        self
    }

    /// Region to render.
    pub fn region(mut self, region: impl Into<Geometry>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sample spacing in meters per pixel.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Upper bound on rendered pixels.
    pub fn max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Validates the request and freezes it into an [`ExportSpec`].
    ///
    /// # Errors
    ///
    /// [`ExportError::InvalidExportSpec`] when the scale is not a positive
    /// finite number, the pixel cap is zero, the region is missing or
    /// empty, or no destination was chosen.
    pub fn build(self) -> Result<ExportSpec, ExportError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ExportError::invalid(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if self.max_pixels == 0 {
            return Err(ExportError::invalid("max_pixels must be positive"));
        }
        let region = self
            .region
            .ok_or_else(|| ExportError::invalid("no export region given"))?;
        if region.is_empty() {
            return Err(ExportError::invalid("export region is empty"));
        }
        let destination = self
            .destination
            .ok_or_else(|| ExportError::invalid("no export destination given"))?;

        let file_name_prefix = self
            .file_name_prefix
            .unwrap_or_else(|| self.description.clone());

        Ok(ExportSpec {
            image: self.image,
            description: self.description,
            file_name_prefix,
            destination,
            region,
            scale: self.scale,
            max_pixels: self.max_pixels,
        })
    }
}

/// One-call form mirroring `buildExport(image, destination, region, scale,
/// maxPixels)`: the destination is a descriptor string such as
/// `drive:earthengine` and the description defaults to the file prefix
/// "export".
pub fn build_export(
    image: ImageExpr,
    destination: &str,
    region: Geometry,
    scale: f64,
    max_pixels: u64,
) -> Result<ExportSpec, ExportError> {
    let destination = ExportDestination::parse(destination)?;
    let mut request = ExportRequest::new(image, "export")
        .region(region)
        .scale(scale)
        .max_pixels(max_pixels);
    request.destination = Some(destination);
    request.build()
}
