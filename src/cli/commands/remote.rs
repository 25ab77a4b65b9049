//! Remote backtest submission and status commands.

use anyhow::{Context, Result};
use trading_core::output::Console;
use trading_core::traits::RemoteTransport;
use trading_core::types::{JobId, RemoteStatus, RunRequest};
use trading_remote::{publish_status, JobCoordinator, StatusTargets};

/// Submit a backtest and print the job identifier.
pub async fn submit<T: RemoteTransport>(
    remote: &JobCoordinator<T>,
    request: &RunRequest,
    mail: &str,
    console: &mut Console<'_>,
) -> Result<JobId> {
    console.say("Running in remote backtesting mode.")?;

    let algorithm = request.algorithm.load()?;
    if request.print_algo {
        console.say(&algorithm)?;
    }

    let id = remote
        .submit(request, &algorithm, mail)
        .await
        .context("Failed to submit remote backtest")?;
    console.say(id.as_str())?;
    Ok(id)
}

/// Poll a job once and write whatever it has produced.
pub async fn status<T: RemoteTransport>(
    remote: &JobCoordinator<T>,
    id: &JobId,
    data_output: &str,
    log_output: &str,
    console: &mut Console<'_>,
) -> Result<RemoteStatus> {
    let outcome = remote
        .poll(id)
        .await
        .with_context(|| format!("Failed to fetch status of {}", id))?;

    let targets = StatusTargets::resolve(data_output, log_output);
    publish_status(&outcome, &targets, console)?;
    Ok(outcome)
}
