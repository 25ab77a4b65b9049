//! Turning validated options into execution requests.

use chrono::{DateTime, Utc};
use trading_core::output::SUPPRESS_TOKEN;
use trading_core::types::{
    AlgoSource, BacktestParams, DataFrequency, FrequencySet, IngestRequest, IngestSource, JobId,
    LiveParams, RunMode, RunRequest,
};

use super::schema::{Capabilities, CommandKind, CommandSchema};
use super::validate::{validate, Invocation, ValidationError, Values};

/// What a validated invocation asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionRequest {
    /// Local backtest or live execution.
    Run(RunRequest),
    /// Backtest submitted to the remote backend.
    RemoteRun { request: RunRequest, mail: String },
    /// One status poll of a remote job.
    RemoteStatus {
        id: JobId,
        data_output: String,
        log_output: String,
    },
    Ingest(IngestRequest),
}

/// Validate `invocation` and build its request.
pub fn parse(
    invocation: &Invocation,
    capabilities: Capabilities,
    now: DateTime<Utc>,
) -> Result<ExecutionRequest, ValidationError> {
    let schema = CommandSchema::for_command(invocation.command, capabilities);
    let values = validate(&schema, invocation, now)?;

    match invocation.command {
        CommandKind::Run => Ok(ExecutionRequest::Run(run_request(&values, now)?)),
        CommandKind::Live => Ok(ExecutionRequest::Run(run_request(&values, now)?)),
        CommandKind::RemoteRun => {
            let mut request = run_request(&values, now)?;
            // The backend owns the results; nothing is written locally.
            request.output = SUPPRESS_TOKEN.to_string();
            Ok(ExecutionRequest::RemoteRun {
                request,
                mail: values.require_text("mail")?.to_string(),
            })
        }
        CommandKind::RemoteStatus => Ok(ExecutionRequest::RemoteStatus {
            id: JobId::new(values.require_text("algo-id")?),
            data_output: values.require_text("data-output")?.to_string(),
            log_output: values.require_text("log-output")?.to_string(),
        }),
        CommandKind::IngestExchange => Ok(ExecutionRequest::Ingest(ingest_request(&values, now)?)),
    }
}

fn algo_source(values: &Values) -> Result<AlgoSource, ValidationError> {
    if let Some(path) = values.path("algofile") {
        return Ok(AlgoSource::File(path.to_path_buf()));
    }
    Ok(AlgoSource::Text(values.require_text("algotext")?.to_string()))
}

fn run_request(values: &Values, now: DateTime<Utc>) -> Result<RunRequest, ValidationError> {
    let command = values.command();
    let mode = match command {
        CommandKind::Live => RunMode::Live(LiveParams {
            live_graph: values.flag("live-graph"),
            simulate_orders: values.flag("simulate-orders"),
            auth_aliases: values.auth_aliases("auth-aliases").to_vec(),
        }),
        _ => RunMode::Backtest(BacktestParams {
            data_frequency: values.frequency("data-frequency").unwrap_or_default(),
            bundle: values.require_text("bundle")?.to_string(),
            bundle_timestamp: values.date("bundle-timestamp").unwrap_or(now),
        }),
    };

    let capital_base = values.amount("capital-base").ok_or_else(|| {
        ValidationError::new(command, "must specify a capital base with '--capital-base'")
    })?;

    Ok(RunRequest {
        algorithm: algo_source(values)?,
        defines: values.defines("define").to_vec(),
        capital_base,
        exchange: values.require_text("exchange-name")?.to_string(),
        algo_namespace: values.text("algo-namespace").map(str::to_string),
        quote_currency: values.require_text("quote-currency")?.to_string(),
        start: values.date("start"),
        end: values.date("end"),
        mode,
        output: values.text("output").unwrap_or(SUPPRESS_TOKEN).to_string(),
        print_algo: values.flag("print-algo"),
        local_namespace: values.optional_flag("local-namespace"),
    })
}

fn ingest_request(values: &Values, now: DateTime<Utc>) -> Result<IngestRequest, ValidationError> {
    let source = match values.path("csv") {
        // A CSV file is ingested whole; range and symbol filters do not apply.
        Some(path) => IngestSource::Csv {
            path: path.to_path_buf(),
        },
        None => IngestSource::exchange(
            values.date("start"),
            values.date("end"),
            values.symbols("include-symbols").to_vec(),
            values.symbols("exclude-symbols").to_vec(),
            now,
        ),
    };

    Ok(IngestRequest {
        exchange: values.require_text("exchange-name")?.to_string(),
        data_frequency: values
            .frequencies("data-frequency")
            .cloned()
            .unwrap_or_else(|| FrequencySet::single(DataFrequency::Daily)),
        source,
        show_progress: values.flag("show-progress"),
        verbose: values.flag("verbose"),
        validate: values.flag("validate"),
    })
}
