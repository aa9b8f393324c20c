//! Explicit rendering context and visualization parameters.
//!
//! Hosted platforms expose an implicit "active map" singleton; here the map
//! is an explicit [`MapContext`] value created per session and dropped at
//! process exit. Adding a layer records the expression and its styling —
//! nothing is evaluated or drawn. [`visualize`] is the one computational
//! piece: it renders an image to 8-bit display bands the way a rendered
//! (rather than raw) export expects.

use crate::expr::{CollectionExpr, FeatureQuery, ImageExpr};
use crate::geometry::{Geometry, Point};
use crate::raster::RasterImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors raised while rendering display bands.
#[derive(Debug, Error, PartialEq)]
pub enum DisplayError {
    /// A requested display band is absent from the image
    #[error("display band '{band}' not found in image")]
    MissingBand { band: String },

    /// Band list must name one (grayscale) or three (RGB) bands
    #[error("expected 1 or 3 display bands, got {count}")]
    BadBandCount { count: usize },

    /// Stretch range must satisfy min < max
    #[error("invalid stretch range: min {min} must be below max {max}")]
    InvalidRange { min: f64, max: f64 },
}

/// Visualization parameters: band selection, stretch range, vector color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    /// Bands to display, in red/green/blue order for RGB
    pub bands: Vec<String>,
    /// Value mapped to display 0
    pub min: f64,
    /// Value mapped to display 255
    pub max: f64,
    /// Outline color for vector layers (e.g. "red")
    pub color: Option<String>,
}

impl VisParams {
    /// Three-band RGB stretch.
    pub fn rgb(red: &str, green: &str, blue: &str, min: f64, max: f64) -> Self {
        Self {
            bands: vec![red.to_string(), green.to_string(), blue.to_string()],
            min,
            max,
            color: None,
        }
    }

    /// Single-band grayscale stretch.
    pub fn gray(band: &str, min: f64, max: f64) -> Self {
        Self {
            bands: vec![band.to_string()],
            min,
            max,
            color: None,
        }
    }

    /// Vector styling only.
    pub fn colored(color: &str) -> Self {
        Self {
            bands: Vec::new(),
            min: 0.0,
            max: 1.0,
            color: Some(color.to_string()),
        }
    }
}

impl Default for VisParams {
    fn default() -> Self {
        Self {
            bands: Vec::new(),
            min: 0.0,
            max: 1.0,
            color: None,
        }
    }
}

/// Renders an image to 8-bit display bands.
///
/// Values stretch linearly from `[min, max]` to `[0, 255]`, clamped at the
/// ends and rounded to whole numbers. No-data stays no-data. The output
/// bands are named `vis-red`/`vis-green`/`vis-blue` for RGB parameters and
/// `vis-gray` for a single band.
pub fn visualize(image: &RasterImage, vis: &VisParams) -> Result<RasterImage, DisplayError> {
    if vis.max <= vis.min {
        return Err(DisplayError::InvalidRange {
            min: vis.min,
            max: vis.max,
        });
    }
    let out_names: &[&str] = match vis.bands.len() {
        1 => &["vis-gray"],
        3 => &["vis-red", "vis-green", "vis-blue"],
        count => return Err(DisplayError::BadBandCount { count }),
    };

    let span = vis.max - vis.min;
    let mut rendered =
        RasterImage::with_transform(image.width(), image.height(), image.transform());
    for (source_name, out_name) in vis.bands.iter().zip(out_names) {
        let band = image
            .band(source_name)
            .ok_or_else(|| DisplayError::MissingBand {
                band: source_name.clone(),
            })?;
        let pixels = band
            .pixels()
            .iter()
            .map(|v| v.map(|value| (((value - vis.min) / span).clamp(0.0, 1.0) * 255.0).round()))
            .collect();
        rendered
            .push_band(*out_name, pixels)
            .expect("display band names are distinct and sized to the grid");
    }
    Ok(rendered)
}

/// One entry in a map context.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
}

/// What a layer displays.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// A single-image expression
    Image { expr: ImageExpr, vis: VisParams },
    /// A whole collection (drawn as its mosaic by convention)
    Collection {
        expr: CollectionExpr,
        vis: VisParams,
    },
    /// A feature-collection query drawn as vector outlines
    Features { query: FeatureQuery, vis: VisParams },
}

/// Per-session rendering context.
///
/// Owns the viewport (center + zoom) and an ordered layer list. Purely
/// presentational: layers record what would be rendered, evaluation stays
/// with the engine.
#[derive(Debug, Default)]
pub struct MapContext {
    center: Option<(Point, u8)>,
    layers: Vec<Layer>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the viewport center and zoom level.
    pub fn set_center(&mut self, center: Point, zoom: u8) {
        self.center = Some((center, zoom));
    }

    /// Centers the viewport on a geometry's bounding box. Empty geometries
    /// leave the viewport unchanged.
    pub fn center_on(&mut self, geometry: &Geometry, zoom: u8) {
        if let Some(bbox) = geometry.bounding_box() {
            self.set_center(bbox.center(), zoom);
        }
    }

    pub fn center(&self) -> Option<(Point, u8)> {
        self.center
    }

    /// Adds an image layer.
    pub fn add_image_layer(&mut self, name: impl Into<String>, expr: ImageExpr, vis: VisParams) {
        let name = name.into();
        info!(layer = %name, "adding image layer");
        self.layers.push(Layer {
            name,
            kind: LayerKind::Image { expr, vis },
        });
    }

    /// Adds a collection layer.
    pub fn add_collection_layer(
        &mut self,
        name: impl Into<String>,
        expr: CollectionExpr,
        vis: VisParams,
    ) {
        let name = name.into();
        info!(layer = %name, "adding collection layer");
        self.layers.push(Layer {
            name,
            kind: LayerKind::Collection { expr, vis },
        });
    }

    /// Adds a feature-collection layer.
    pub fn add_feature_layer(
        &mut self,
        name: impl Into<String>,
        query: FeatureQuery,
        vis: VisParams,
    ) {
        let name = name.into();
        info!(layer = %name, "adding feature layer");
        self.layers.push(Layer {
            name,
            kind: LayerKind::Features { query, vis },
        });
    }

    /// Layers in insertion (draw) order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}
