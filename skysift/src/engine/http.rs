//! Remote evaluation client.
//!
//! Serializes request trees to JSON and posts them to an evaluation
//! service. The service does all the computing; this client only moves
//! declarative requests out and materialized results back. Remote failures
//! (quota, bad asset path, network) come back as [`EngineError::Remote`]
//! and are never retried here.

use super::types::{AsyncEngine, EngineError, ExportHandle};
use crate::export::ExportSpec;
use crate::expr::{CollectionExpr, FeatureQuery, ImageExpr};
use crate::geometry::Geometry;
use crate::raster::RasterImage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default timeout for evaluation requests. Compositing large collections
/// server-side is slow; this is deliberately generous.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Deserialize)]
struct SizeResponse {
    size: usize,
}

/// [`AsyncEngine`] speaking JSON-over-HTTP to a remote evaluation service.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEngine {
    /// Creates a client for the given service endpoint, e.g.
    /// `http://127.0.0.1:8090`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, EngineError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with an explicit request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Remote(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, EngineError> {
        let url = self.url(path);
        debug!(%url, "posting evaluation request");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| EngineError::Remote(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::Remote(format!("{} from {}: {}", status, url, detail)));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

impl AsyncEngine for HttpEngine {
    async fn collection_size(&self, expr: &CollectionExpr) -> Result<usize, EngineError> {
        let response: SizeResponse = self.post("collection/size", expr).await?;
        Ok(response.size)
    }

    async fn evaluate(&self, expr: &ImageExpr) -> Result<RasterImage, EngineError> {
        self.post("image/evaluate", expr).await
    }

    async fn resolve_geometry(&self, query: &FeatureQuery) -> Result<Geometry, EngineError> {
        self.post("features/geometry", query).await
    }

    async fn submit_export(&self, spec: &ExportSpec) -> Result<ExportHandle, EngineError> {
        self.post("export", spec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let engine = HttpEngine::new("http://127.0.0.1:8090/").unwrap();
        assert_eq!(engine.endpoint(), "http://127.0.0.1:8090");
        assert_eq!(engine.url("export"), "http://127.0.0.1:8090/export");
    }

    #[test]
    fn test_url_paths() {
        let engine = HttpEngine::new("http://engine.example").unwrap();
        assert_eq!(
            engine.url("collection/size"),
            "http://engine.example/collection/size"
        );
        assert_eq!(
            engine.url("image/evaluate"),
            "http://engine.example/image/evaluate"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_error() {
        // Reserved TEST-NET address: connections fail fast without
        // touching a real service.
        let engine = HttpEngine::with_timeout("http://192.0.2.1:9", 1).unwrap();
        let expr = CollectionExpr::load("COPERNICUS/S2");
        let err = engine.collection_size(&expr).await.unwrap_err();
        assert!(matches!(err, EngineError::Remote(_)));
    }
}
