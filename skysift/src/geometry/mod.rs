//! Vector geometry types used for spatial filtering and clipping.
//!
//! Geometries are immutable once constructed. They appear in three places:
//! spatial bounds predicates (`Filter::bounds`), image clipping, and export
//! region descriptors. Only the predicates the rest of the crate needs are
//! implemented: emptiness, bounding boxes, point containment and
//! polygon/polygon intersection tests.

mod ops;
mod types;

pub use types::{Geometry, MultiPolygon, Point, Polygon, Rect};
