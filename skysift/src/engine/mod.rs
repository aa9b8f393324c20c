//! Evaluation engines: the boundary between built request trees and the
//! services that compute them.
//!
//! Expressions are declarative until a terminal sink — [`Engine::evaluate`],
//! [`Engine::collection_size`], [`Engine::resolve_geometry`],
//! [`Engine::submit_export`] — hands them to an engine:
//!
//! - [`LocalEngine`] computes the documented reference semantics over an
//!   in-memory [`MemoryCatalog`] of materialized scenes. It backs the test
//!   suite and the CLI demo session.
//! - [`HttpEngine`] posts the serialized tree to a remote evaluation
//!   service and returns its results; remote failures surface opaquely and
//!   are never retried here.

mod http;
mod local;
mod types;

pub use http::HttpEngine;
pub use local::{LocalEngine, MemoryCatalog};
pub use types::{AsyncEngine, Engine, EngineError, ExportHandle};
