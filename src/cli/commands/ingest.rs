//! Exchange bundle ingestion command.

use anyhow::{Context, Result};
use trading_core::output::Console;
use trading_core::traits::BundleIngester;
use trading_core::types::{IngestRequest, IngestSource};
use tracing::info;

pub async fn execute(
    ingester: &dyn BundleIngester,
    request: &IngestRequest,
    console: &mut Console<'_>,
) -> Result<()> {
    console.say(format!("Trying to ingest exchange bundle {}...", request.exchange))?;

    match &request.source {
        IngestSource::Csv { path } => info!(exchange = %request.exchange, "Ingesting CSV {:?}", path),
        IngestSource::Exchange { start, end, .. } => info!(
            exchange = %request.exchange,
            frequency = %request.data_frequency,
            %start,
            %end,
            "Ingesting from exchange"
        ),
    }

    ingester
        .ingest(request)
        .await
        .with_context(|| format!("Failed to ingest bundle {}", request.exchange))
}
