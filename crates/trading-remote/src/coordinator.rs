//! Submit/poll protocol for remote backtests.

use trading_core::error::TransportError;
use trading_core::output::{Console, ConsoleStream, OutputError, OutputTarget};
use trading_core::traits::RemoteTransport;
use trading_core::types::{JobId, RemoteStatus, RunRequest};
use tracing::{info, warn};

/// Printed above performance data written to the console.
pub const PERFORMANCE_LABEL: &str = "the performance data is:";

/// Where a poll writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTargets {
    pub data: OutputTarget,
    pub log: OutputTarget,
}

impl StatusTargets {
    /// Resolve the data (`-` → stdout) and log (`-` → stderr) tokens.
    pub fn resolve(data_output: &str, log_output: &str) -> Self {
        Self {
            data: OutputTarget::resolve(data_output, ConsoleStream::Primary),
            log: OutputTarget::resolve(log_output, ConsoleStream::Secondary),
        }
    }
}

impl Default for StatusTargets {
    fn default() -> Self {
        Self::resolve("-", "-")
    }
}

/// Coordinates remote jobs over a [`RemoteTransport`].
///
/// One transport call per operation: submissions are never retried and polls
/// never loop until a terminal state.
pub struct JobCoordinator<T> {
    transport: T,
}

impl<T: RemoteTransport> JobCoordinator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a backtest and return the identifier assigned by the backend.
    pub async fn submit(
        &self,
        request: &RunRequest,
        algorithm: &str,
        mail: &str,
    ) -> Result<JobId, TransportError> {
        let id = self.transport.submit(request, algorithm, mail).await?;
        info!(algo_id = %id, transport = self.transport.name(), "Remote backtest submitted");
        Ok(id)
    }

    /// Fetch the status of a job once.
    pub async fn poll(&self, id: &JobId) -> Result<RemoteStatus, TransportError> {
        let outcome = self.transport.status(id).await?;
        info!(algo_id = %id, status = outcome.status(), "Remote status received");
        Ok(outcome)
    }
}

/// Write a poll outcome.
///
/// A bare status is printed alone. A detailed outcome writes the log, then the
/// performance data, then prints the status last. Every artifact is attempted
/// even when an earlier one fails; the first failure is returned.
pub fn publish_status(
    outcome: &RemoteStatus,
    targets: &StatusTargets,
    console: &mut Console<'_>,
) -> Result<(), OutputError> {
    let mut first_error = None;

    if let RemoteStatus::Detailed { result, log, .. } = outcome {
        if let Some(log) = log {
            if let Err(err) = targets.log.write_text(console, log) {
                warn!("Failed to write remote log: {}", err);
                first_error.get_or_insert(err);
            }
        }
        if let Some(result) = result {
            if let Err(err) = targets.data.write_report(console, result, Some(PERFORMANCE_LABEL)) {
                warn!("Failed to write performance data: {}", err);
                first_error.get_or_insert(err);
            }
        }
    }

    let printed = console.say(outcome.status());
    match first_error {
        Some(err) => Err(err),
        None => printed,
    }
}
