//! Scene metadata and feature collections.
//!
//! An image collection is a remote handle; what the filters actually see is
//! per-scene metadata: acquisition time, footprint geometry, and a property
//! map (e.g. `CLOUDY_PIXEL_PERCENTAGE`). [`Scene`] pairs that metadata with
//! a materialized raster for the in-process reference engine.
//!
//! Feature collections carry vector boundaries (administrative regions,
//! uploaded shapefiles). Filtering one and taking its geometry yields the
//! clip/export region, as in `urban.filter(..).geometry()`.

use crate::geometry::{Geometry, MultiPolygon, Polygon};
use crate::raster::RasterImage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata property value: numeric or textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Numeric view, `None` for text values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// Named metadata properties, ordered for stable serialization.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Metadata for one scene of an image collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    /// Scene identifier within its collection
    pub id: String,
    /// Acquisition timestamp
    pub timestamp: DateTime<Utc>,
    /// Ground footprint of the scene
    pub footprint: Geometry,
    /// Scene properties (e.g. CLOUDY_PIXEL_PERCENTAGE)
    pub properties: Properties,
}

impl ImageMeta {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, footprint: Geometry) -> Self {
        Self {
            id: id.into(),
            timestamp,
            footprint,
            properties: Properties::new(),
        }
    }

    /// Adds a property, consuming and returning the metadata for chaining.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// A catalog entry: scene metadata plus its materialized raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub meta: ImageMeta,
    pub image: RasterImage,
}

impl Scene {
    pub fn new(meta: ImageMeta, image: RasterImage) -> Self {
        Self { meta, image }
    }
}

/// One member of a feature collection: a vector boundary with properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature identifier (the collection's `system:index`)
    pub id: String,
    /// Boundary geometry
    pub geometry: Geometry,
    /// Feature properties (e.g. country_na)
    pub properties: Properties,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Combined geometry of a set of features: the multi-polygon union of their
/// polygonal parts. Point features contribute nothing to an area union.
pub fn union_geometry(features: &[Feature]) -> Geometry {
    let mut polygons: Vec<Polygon> = Vec::new();
    for feature in features {
        match &feature.geometry {
            Geometry::Polygon(p) => polygons.push(p.clone()),
            Geometry::MultiPolygon(mp) => polygons.extend(mp.polygons().iter().cloned()),
            Geometry::Point(_) => {}
        }
    }
    Geometry::MultiPolygon(MultiPolygon::new(polygons))
}
