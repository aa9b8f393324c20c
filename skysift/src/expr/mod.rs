//! Declarative request trees.
//!
//! Building an expression never computes anything: the tree is the request a
//! remote engine (or the in-process [`LocalEngine`](crate::engine::LocalEngine))
//! evaluates when a terminal sink — evaluate, size, export — is invoked.
//! This makes the deferred-evaluation handles of hosted platforms explicit:
//! a distinct build phase producing a serializable tree, and an evaluate
//! phase owned by an engine.
//!
//! The fluent builders mirror the hosted-platform chaining style:
//!
//! ```
//! use skysift::expr::CollectionExpr;
//! use skysift::filter::Filter;
//! use skysift::geometry::Geometry;
//!
//! let composite = CollectionExpr::load("COPERNICUS/S2")
//!     .filter(Filter::lt("CLOUDY_PIXEL_PERCENTAGE", 30.0))
//!     .filter(Filter::date_range("2019-01-01", "2020-01-01").unwrap())
//!     .filter(Filter::bounds(Geometry::point(-117.1801, 46.727)))
//!     .median();
//! ```

use crate::composite::CompositePolicy;
use crate::display::VisParams;
use crate::filter::Filter;
use crate::geometry::Geometry;
use crate::raster::{S2_CIRRUS_BIT, S2_CLOUD_BIT, S2_QA_BAND};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A band-name selector, e.g. `B.*` for all reflectance bands.
///
/// The pattern is an anchored regular expression: it must match the whole
/// band name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSelector {
    pattern: String,
}

impl BandSelector {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compiles the anchored matcher. Invalid patterns surface at evaluate
    /// time, not build time.
    pub fn to_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{})$", self.pattern))
    }
}

/// A deferred image-collection computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CollectionExpr {
    /// A named collection in the remote catalog
    Load { id: String },
    /// Scenes of `source` whose metadata satisfies `predicate`
    Filter {
        source: Box<CollectionExpr>,
        predicate: Filter,
    },
    /// Cloud masking mapped over every scene of `source`
    MaskClouds {
        source: Box<CollectionExpr>,
        qa_band: String,
        cloud_bit: u8,
        cirrus_bit: u8,
    },
}

impl CollectionExpr {
    /// Starts a tree from a catalog collection id.
    pub fn load(id: impl Into<String>) -> Self {
        CollectionExpr::Load { id: id.into() }
    }

    /// Appends a filter predicate.
    pub fn filter(self, predicate: Filter) -> Self {
        CollectionExpr::Filter {
            source: Box::new(self),
            predicate,
        }
    }

    /// Maps cloud masking over every scene.
    pub fn mask_clouds(self, qa_band: impl Into<String>, cloud_bit: u8, cirrus_bit: u8) -> Self {
        CollectionExpr::MaskClouds {
            source: Box::new(self),
            qa_band: qa_band.into(),
            cloud_bit,
            cirrus_bit,
        }
    }

    /// [`Self::mask_clouds`] with the Sentinel-2 QA60 conventions.
    pub fn mask_s2_clouds(self) -> Self {
        self.mask_clouds(S2_QA_BAND, S2_CLOUD_BIT, S2_CIRRUS_BIT)
    }

    /// Terminal composite: first valid value by collection order, later wins.
    pub fn mosaic(self) -> ImageExpr {
        self.composite(CompositePolicy::Mosaic)
    }

    /// Terminal composite: per-pixel, per-band median.
    pub fn median(self) -> ImageExpr {
        self.composite(CompositePolicy::Median)
    }

    /// Terminal composite: per-pixel, per-band mean.
    pub fn mean(self) -> ImageExpr {
        self.composite(CompositePolicy::Mean)
    }

    /// Terminal composite under an explicit policy.
    pub fn composite(self, policy: CompositePolicy) -> ImageExpr {
        ImageExpr::Composite {
            source: self,
            policy,
        }
    }

    /// The catalog id at the root of the tree.
    pub fn collection_id(&self) -> &str {
        match self {
            CollectionExpr::Load { id } => id,
            CollectionExpr::Filter { source, .. } => source.collection_id(),
            CollectionExpr::MaskClouds { source, .. } => source.collection_id(),
        }
    }
}

/// A deferred single-image computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageExpr {
    /// Aggregation of a collection into one image
    Composite {
        source: CollectionExpr,
        policy: CompositePolicy,
    },
    /// Pixels outside `geometry` become no-data
    Clip {
        source: Box<ImageExpr>,
        geometry: Geometry,
    },
    /// Keep only bands matching the selector
    Select {
        source: Box<ImageExpr>,
        bands: BandSelector,
    },
    /// Render to 8-bit display bands using stretch parameters
    Visualize {
        source: Box<ImageExpr>,
        vis: VisParams,
    },
}

impl ImageExpr {
    /// Clips the image to a geometry.
    pub fn clip(self, geometry: impl Into<Geometry>) -> Self {
        ImageExpr::Clip {
            source: Box::new(self),
            geometry: geometry.into(),
        }
    }

    /// Keeps only bands whose names match the anchored pattern.
    pub fn select(self, pattern: impl Into<String>) -> Self {
        ImageExpr::Select {
            source: Box::new(self),
            bands: BandSelector::new(pattern),
        }
    }

    /// Renders the image with visualization parameters.
    pub fn visualize(self, vis: VisParams) -> Self {
        ImageExpr::Visualize {
            source: Box::new(self),
            vis,
        }
    }

    /// The catalog id of the collection this image derives from.
    pub fn collection_id(&self) -> &str {
        match self {
            ImageExpr::Composite { source, .. } => source.collection_id(),
            ImageExpr::Clip { source, .. } => source.collection_id(),
            ImageExpr::Select { source, .. } => source.collection_id(),
            ImageExpr::Visualize { source, .. } => source.collection_id(),
        }
    }
}

/// A feature-collection lookup: a catalog id plus filter predicates.
///
/// Resolving one yields the multi-polygon union of the matched features'
/// geometries, the usual way a clip/export region is obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureQuery {
    pub collection: String,
    pub predicates: Vec<Filter>,
}

impl FeatureQuery {
    pub fn load(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            predicates: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Filter) -> Self {
        self.predicates.push(predicate);
        self
    }
}
