//! Engine traits, errors and handles.

use crate::composite::CompositeError;
use crate::display::DisplayError;
use crate::export::ExportSpec;
use crate::expr::{CollectionExpr, FeatureQuery, ImageExpr};
use crate::geometry::Geometry;
use crate::raster::{MaskError, RasterImage};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Errors surfaced by an engine when a terminal sink is invoked.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The catalog has no image collection with this id
    #[error("unknown image collection '{0}'")]
    UnknownCollection(String),

    /// The catalog has no feature collection with this id
    #[error("unknown feature collection '{0}'")]
    UnknownFeatureCollection(String),

    /// A feature query matched nothing, so no geometry can be resolved
    #[error("no features of '{0}' matched the query")]
    NoMatchingFeatures(String),

    /// A band selector pattern failed to compile
    #[error("invalid band pattern '{pattern}': {message}")]
    InvalidBandPattern { pattern: String, message: String },

    /// Cloud masking failed
    #[error(transparent)]
    Mask(#[from] MaskError),

    /// Compositing failed
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// Visualization rendering failed
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// Opaque remote-service failure (quota, asset path, network). Not
    /// retried by this crate.
    #[error("remote engine error: {0}")]
    Remote(String),

    /// Request or response (de)serialization failed
    #[error("request serialization failed: {0}")]
    Serialization(String),
}

/// Opaque receipt for a submitted export.
///
/// Progress and cancellation live entirely with the remote service; the
/// handle only identifies the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHandle {
    /// Submission identifier assigned by the engine
    pub id: String,
    /// Task description echoed from the export spec
    pub description: String,
}

/// Synchronous evaluation interface.
///
/// Terminal sinks only: every method takes a finished request tree and
/// computes (or delegates) its result on demand.
pub trait Engine: Send + Sync {
    /// Number of scenes the collection expression resolves to.
    fn collection_size(&self, expr: &CollectionExpr) -> Result<usize, EngineError>;

    /// Materializes an image expression.
    fn evaluate(&self, expr: &ImageExpr) -> Result<RasterImage, EngineError>;

    /// Resolves a feature query to the union geometry of its matches.
    fn resolve_geometry(&self, query: &FeatureQuery) -> Result<Geometry, EngineError>;

    /// Submits an export. Fire-and-forget: the returned handle is a
    /// receipt, not a completion.
    fn submit_export(&self, spec: &ExportSpec) -> Result<ExportHandle, EngineError>;
}

/// Non-blocking evaluation interface for remote engines.
pub trait AsyncEngine: Send + Sync {
    /// Number of scenes the collection expression resolves to.
    fn collection_size(
        &self,
        expr: &CollectionExpr,
    ) -> impl Future<Output = Result<usize, EngineError>> + Send;

    /// Materializes an image expression.
    fn evaluate(
        &self,
        expr: &ImageExpr,
    ) -> impl Future<Output = Result<RasterImage, EngineError>> + Send;

    /// Resolves a feature query to the union geometry of its matches.
    fn resolve_geometry(
        &self,
        query: &FeatureQuery,
    ) -> impl Future<Output = Result<Geometry, EngineError>> + Send;

    /// Submits an export and returns the service's receipt.
    fn submit_export(
        &self,
        spec: &ExportSpec,
    ) -> impl Future<Output = Result<ExportHandle, EngineError>> + Send;
}
