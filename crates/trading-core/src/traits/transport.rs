//! Remote job transport trait.

use crate::error::TransportError;
use crate::types::{JobId, RemoteStatus, RunRequest};
use async_trait::async_trait;

/// Request/response channel to the remote backtesting backend.
///
/// Implementations must not retry `submit` on their own: the backend gives no
/// idempotency guarantee, so a retry can start a second job.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Submit a backtest.
    ///
    /// # Arguments
    /// * `request` - The validated run request
    /// * `algorithm` - The script text
    /// * `mail` - Address notified when the job finishes
    ///
    /// # Returns
    /// The identifier assigned to the job
    async fn submit(
        &self,
        request: &RunRequest,
        algorithm: &str,
        mail: &str,
    ) -> Result<JobId, TransportError>;

    /// Fetch the current status of a job.
    async fn status(&self, id: &JobId) -> Result<RemoteStatus, TransportError>;

    /// Get the transport name.
    fn name(&self) -> &str;
}
