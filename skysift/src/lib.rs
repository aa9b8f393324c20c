//! skysift - declarative satellite-imagery filtering, compositing and export
//!
//! Models a remote-sensing analysis session as an explicit request tree:
//! load a collection, filter it by metadata, date and location, mask clouds,
//! composite, clip to a vector boundary, and build export requests. Building
//! an expression computes nothing; evaluation happens when a terminal sink
//! hands the tree to an [`engine::Engine`].
//!
//! # Example
//!
//! ```
//! use skysift::engine::{Engine, LocalEngine, MemoryCatalog};
//! use skysift::expr::CollectionExpr;
//! use skysift::filter::Filter;
//! use skysift::geometry::Geometry;
//!
//! let expr = CollectionExpr::load("COPERNICUS/S2")
//!     .filter(Filter::lt("CLOUDY_PIXEL_PERCENTAGE", 30.0))
//!     .filter(Filter::date_range("2019-01-01", "2020-01-01").unwrap())
//!     .filter(Filter::bounds(Geometry::point(-117.1801, 46.727)))
//!     .mask_s2_clouds()
//!     .median();
//!
//! let engine = LocalEngine::new(MemoryCatalog::new());
//! // Evaluation fails here only because the demo catalog is empty.
//! assert!(engine.evaluate(&expr).is_err());
//! ```

pub mod collection;
pub mod composite;
pub mod config;
pub mod display;
pub mod engine;
pub mod export;
pub mod expr;
pub mod filter;
pub mod geometry;
pub mod logging;
pub mod raster;

/// Version of the skysift library and CLI, injected from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
