//! Local algorithm execution, shared by `run` and `live`.

use anyhow::{Context, Result};
use trading_core::output::{Console, ConsoleStream, OutputTarget};
use trading_core::traits::AlgorithmRunner;
use trading_core::types::{PerformanceReport, RunRequest};
use tracing::info;

/// Run an algorithm through the local engine and write its performance data.
///
/// The report is returned whatever the output destination, so a suppressed
/// write (`--`) still hands the result back to the caller.
pub async fn execute(
    runner: &dyn AlgorithmRunner,
    request: &RunRequest,
    console: &mut Console<'_>,
) -> Result<PerformanceReport> {
    console.say(format!("Running in {} mode.", request.mode_label()))?;

    let algorithm = request.algorithm.load()?;
    if request.print_algo {
        console.say(&algorithm)?;
    }

    info!(
        engine = runner.name(),
        exchange = %request.exchange,
        capital_base = %request.capital_base,
        "Starting algorithm"
    );
    let report = runner
        .run(request, &algorithm)
        .await
        .context("Algorithm execution failed")?;

    let target = OutputTarget::resolve(&request.output, ConsoleStream::Primary);
    target.write_report(console, &report, None)?;
    if let OutputTarget::File(path) = &target {
        info!("Performance data saved to {:?}", path);
    }

    Ok(report)
}
