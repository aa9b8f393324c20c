//! In-process reference engine.
//!
//! Evaluates request trees against an in-memory catalog using the
//! documented semantics: predicate filtering, per-scene cloud masking,
//! mosaic/median/mean compositing, clipping, band selection and
//! visualization. Evaluation is synchronous and happens only when a
//! terminal sink is invoked; nothing is cached between calls.

use super::types::{Engine, EngineError, ExportHandle};
use crate::collection::{union_geometry, Feature, Scene};
use crate::composite::composite;
use crate::display::visualize;
use crate::export::ExportSpec;
use crate::expr::{CollectionExpr, FeatureQuery, ImageExpr};
use crate::geometry::Geometry;
use crate::raster::{mask_clouds, RasterImage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// In-memory catalog of image collections and feature collections.
///
/// Scene order within a collection is insertion order, which is what the
/// mosaic policy's "most recently added wins" refers to.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    collections: HashMap<String, Vec<Scene>>,
    features: HashMap<String, Vec<Feature>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scene to a collection, creating the collection if needed.
    pub fn add_scene(&mut self, collection: impl Into<String>, scene: Scene) {
        self.collections.entry(collection.into()).or_default().push(scene);
    }

    /// Appends a feature to a feature collection.
    pub fn add_feature(&mut self, collection: impl Into<String>, feature: Feature) {
        self.features.entry(collection.into()).or_default().push(feature);
    }

    fn scenes(&self, id: &str) -> Result<&[Scene], EngineError> {
        self.collections
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::UnknownCollection(id.to_string()))
    }

    fn feature_collection(&self, id: &str) -> Result<&[Feature], EngineError> {
        self.features
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::UnknownFeatureCollection(id.to_string()))
    }
}

/// Reference [`Engine`] over a [`MemoryCatalog`].
#[derive(Debug)]
pub struct LocalEngine {
    catalog: MemoryCatalog,
    export_counter: AtomicU64,
}

impl LocalEngine {
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self {
            catalog,
            export_counter: AtomicU64::new(1),
        }
    }

    /// Resolves a collection expression to its scenes, applying filters and
    /// mapped operations in tree order.
    fn eval_collection(&self, expr: &CollectionExpr) -> Result<Vec<Scene>, EngineError> {
        match expr {
            CollectionExpr::Load { id } => Ok(self.catalog.scenes(id)?.to_vec()),
            CollectionExpr::Filter { source, predicate } => {
                let mut scenes = self.eval_collection(source)?;
                scenes.retain(|scene| predicate.matches(&scene.meta));
                Ok(scenes)
            }
            CollectionExpr::MaskClouds {
                source,
                qa_band,
                cloud_bit,
                cirrus_bit,
            } => {
                let scenes = self.eval_collection(source)?;
                scenes
                    .into_iter()
                    .map(|scene| {
                        let image = mask_clouds(&scene.image, qa_band, *cloud_bit, *cirrus_bit)?;
                        Ok(Scene::new(scene.meta, image))
                    })
                    .collect()
            }
        }
    }
}

impl Engine for LocalEngine {
    fn collection_size(&self, expr: &CollectionExpr) -> Result<usize, EngineError> {
        Ok(self.eval_collection(expr)?.len())
    }

    fn evaluate(&self, expr: &ImageExpr) -> Result<RasterImage, EngineError> {
        match expr {
            ImageExpr::Composite { source, policy } => {
                let scenes = self.eval_collection(source)?;
                let images: Vec<RasterImage> = scenes.into_iter().map(|s| s.image).collect();
                Ok(composite(*policy, &images)?)
            }
            ImageExpr::Clip { source, geometry } => {
                Ok(self.evaluate(source)?.clip(geometry))
            }
            ImageExpr::Select { source, bands } => {
                let regex = bands.to_regex().map_err(|e| EngineError::InvalidBandPattern {
                    pattern: bands.pattern().to_string(),
                    message: e.to_string(),
                })?;
                Ok(self.evaluate(source)?.select_bands(|name| regex.is_match(name)))
            }
            ImageExpr::Visualize { source, vis } => {
                Ok(visualize(&self.evaluate(source)?, vis)?)
            }
        }
    }

    fn resolve_geometry(&self, query: &FeatureQuery) -> Result<Geometry, EngineError> {
        let features = self.catalog.feature_collection(&query.collection)?;
        let matched: Vec<Feature> = features
            .iter()
            .filter(|f| query.predicates.iter().all(|p| p.matches(*f)))
            .cloned()
            .collect();
        if matched.is_empty() {
            return Err(EngineError::NoMatchingFeatures(query.collection.clone()));
        }
        Ok(union_geometry(&matched))
    }

    fn submit_export(&self, spec: &ExportSpec) -> Result<ExportHandle, EngineError> {
        let id = format!("export-{:04}", self.export_counter.fetch_add(1, Ordering::Relaxed));
        info!(
            id = %id,
            description = spec.description(),
            scale = spec.scale(),
            max_pixels = spec.max_pixels(),
            "export submitted"
        );
        Ok(ExportHandle {
            id,
            description: spec.description().to_string(),
        })
    }
}
