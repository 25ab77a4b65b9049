//! Bundle ingestion engine trait.

use crate::error::EngineError;
use crate::types::IngestRequest;
use async_trait::async_trait;

/// Trait for engines that fetch and store exchange data bundles.
#[async_trait]
pub trait BundleIngester: Send + Sync {
    /// Ingest the bundle described by `request`.
    async fn ingest(&self, request: &IngestRequest) -> Result<(), EngineError>;

    /// Get the engine name.
    fn name(&self) -> &str;
}
