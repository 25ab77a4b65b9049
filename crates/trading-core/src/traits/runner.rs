//! Strategy-execution engine trait.

use crate::error::EngineError;
use crate::types::{PerformanceReport, RunRequest};
use async_trait::async_trait;

/// Trait for engines that execute an algorithm locally.
///
/// The same engine serves historical simulations and live/paper trading; the
/// request's [`RunMode`](crate::types::RunMode) tells them apart.
#[async_trait]
pub trait AlgorithmRunner: Send + Sync {
    /// Execute the algorithm to completion.
    ///
    /// # Arguments
    /// * `request` - The validated run request
    /// * `algorithm` - The script text, already loaded from its source
    ///
    /// # Returns
    /// The performance data produced by the run
    async fn run(
        &self,
        request: &RunRequest,
        algorithm: &str,
    ) -> Result<PerformanceReport, EngineError>;

    /// Get the engine name.
    fn name(&self) -> &str;
}
