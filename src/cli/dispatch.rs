//! Routing validated invocations to the engines and the remote backend.

use anyhow::Result;
use chrono::{DateTime, Utc};
use trading_core::output::Console;
use trading_core::traits::{AlgorithmRunner, BundleIngester, RemoteTransport};
use trading_core::types::{JobId, PerformanceReport, RemoteStatus};
use trading_remote::JobCoordinator;
use tracing::debug;

use super::commands;
use super::request::{parse, ExecutionRequest};
use super::schema::Capabilities;
use super::validate::Invocation;

/// Result of one dispatched invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Performance data of a local run, kept even when its write was suppressed.
    Performance(PerformanceReport),
    Submitted(JobId),
    Status(RemoteStatus),
    Ingested,
}

pub struct Dispatcher<'a, T> {
    runner: &'a dyn AlgorithmRunner,
    ingester: &'a dyn BundleIngester,
    remote: &'a JobCoordinator<T>,
    capabilities: Capabilities,
}

impl<'a, T: RemoteTransport> Dispatcher<'a, T> {
    pub fn new(
        runner: &'a dyn AlgorithmRunner,
        ingester: &'a dyn BundleIngester,
        remote: &'a JobCoordinator<T>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            runner,
            ingester,
            remote,
            capabilities,
        }
    }

    /// Validate and execute one invocation.
    ///
    /// Validation runs on every call; a rejected invocation returns a
    /// [`ValidationError`](super::validate::ValidationError) before any
    /// collaborator is touched.
    pub async fn execute(
        &self,
        invocation: &Invocation,
        console: &mut Console<'_>,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let request = parse(invocation, self.capabilities, now)?;
        debug!(command = invocation.command.name(), "Invocation validated");

        match request {
            ExecutionRequest::Run(request) => {
                commands::run::execute(self.runner, &request, console)
                    .await
                    .map(Outcome::Performance)
            }
            ExecutionRequest::RemoteRun { request, mail } => {
                commands::remote::submit(self.remote, &request, &mail, console)
                    .await
                    .map(Outcome::Submitted)
            }
            ExecutionRequest::RemoteStatus {
                id,
                data_output,
                log_output,
            } => commands::remote::status(self.remote, &id, &data_output, &log_output, console)
                .await
                .map(Outcome::Status),
            ExecutionRequest::Ingest(request) => {
                commands::ingest::execute(self.ingester, &request, console).await?;
                Ok(Outcome::Ingested)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::schema::CommandKind;
    use crate::cli::validate::ValidationError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use trading_core::error::{EngineError, TransportError};
    use trading_core::types::{IngestRequest, RunRequest};

    #[derive(Default)]
    struct FakeEngine {
        runs: AtomicUsize,
        ingests: AtomicUsize,
        last_algorithm: Mutex<Option<String>>,
    }

    #[async_trait]
    impl AlgorithmRunner for FakeEngine {
        async fn run(
            &self,
            _request: &RunRequest,
            algorithm: &str,
        ) -> Result<PerformanceReport, EngineError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            *self.last_algorithm.lock().unwrap() = Some(algorithm.to_string());
            Ok(PerformanceReport::new(json!({"sharpe": 1.25})))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    #[async_trait]
    impl BundleIngester for FakeEngine {
        async fn ingest(&self, _request: &IngestRequest) -> Result<(), EngineError> {
            self.ingests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FakeRemote {
        submits: AtomicUsize,
        polls: AtomicUsize,
        outcome: RemoteStatus,
    }

    impl FakeRemote {
        fn returning(outcome: RemoteStatus) -> Self {
            Self {
                submits: AtomicUsize::new(0),
                polls: AtomicUsize::new(0),
                outcome,
            }
        }
    }

    #[async_trait]
    impl RemoteTransport for FakeRemote {
        async fn submit(
            &self,
            _request: &RunRequest,
            _algorithm: &str,
            _mail: &str,
        ) -> Result<JobId, TransportError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            Ok(JobId::new("job-42"))
        }

        async fn status(&self, _id: &JobId) -> Result<RemoteStatus, TransportError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn backtest(command: CommandKind) -> Invocation {
        Invocation::new(command)
            .with("algotext", "def initialize(context): pass")
            .with("start", "2017-01-01")
            .with("end", "2017-12-31")
            .with("exchange-name", "poloniex")
            .with("quote-currency", "usdt")
            .with("capital-base", "1000")
    }

    struct Harness {
        engine: FakeEngine,
        remote: JobCoordinator<FakeRemote>,
        out: Vec<u8>,
        err: Vec<u8>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_status(RemoteStatus::Status("running".into()))
        }

        fn with_status(outcome: RemoteStatus) -> Self {
            Self {
                engine: FakeEngine::default(),
                remote: JobCoordinator::new(FakeRemote::returning(outcome)),
                out: Vec::new(),
                err: Vec::new(),
            }
        }

        async fn execute(&mut self, invocation: &Invocation) -> Result<Outcome> {
            let dispatcher = Dispatcher::new(
                &self.engine,
                &self.engine,
                &self.remote,
                Capabilities::default(),
            );
            let mut console = Console::new(&mut self.out, &mut self.err);
            dispatcher.execute(invocation, &mut console, now()).await
        }

        fn stdout(&self) -> String {
            String::from_utf8(self.out.clone()).unwrap()
        }

        fn calls(&self) -> usize {
            self.engine.runs.load(Ordering::SeqCst)
                + self.engine.ingests.load(Ordering::SeqCst)
                + self.remote.transport().submits.load(Ordering::SeqCst)
                + self.remote.transport().polls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_backtest_run() {
        let mut harness = Harness::new();
        let outcome = harness.execute(&backtest(CommandKind::Run)).await.unwrap();

        assert!(matches!(outcome, Outcome::Performance(_)));
        assert_eq!(harness.engine.runs.load(Ordering::SeqCst), 1);
        let stdout = harness.stdout();
        assert!(stdout.starts_with("Running in backtesting mode.\n"));
        assert!(stdout.contains("1.25"));
    }

    #[tokio::test]
    async fn test_suppressed_output_keeps_result() {
        let mut harness = Harness::new();
        let outcome = harness
            .execute(&backtest(CommandKind::Run).with("output", "--"))
            .await
            .unwrap();

        match outcome {
            Outcome::Performance(report) => assert_eq!(report.data()["sharpe"], 1.25),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(harness.stdout(), "Running in backtesting mode.\n");
    }

    #[tokio::test]
    async fn test_print_algo_echoes_script() {
        let mut harness = Harness::new();
        harness
            .execute(&backtest(CommandKind::Run).with("print-algo", "true").with("output", "--"))
            .await
            .unwrap();

        assert!(harness.stdout().contains("def initialize(context): pass"));
        assert_eq!(
            harness.engine.last_algorithm.lock().unwrap().as_deref(),
            Some("def initialize(context): pass")
        );
    }

    #[tokio::test]
    async fn test_conflicting_sources_touch_nothing() {
        let mut harness = Harness::new();
        let algo = tempfile::NamedTempFile::new().unwrap();
        let invocation =
            backtest(CommandKind::Run).with("algofile", algo.path().display().to_string());
        let err = harness.execute(&invocation).await.unwrap_err();

        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(validation.command, CommandKind::Run);
        assert_eq!(harness.calls(), 0);
        assert!(harness.stdout().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_remote_run_never_submits() {
        let mut harness = Harness::new();
        let invocation = backtest(CommandKind::RemoteRun).with("mail", "nobody");
        assert!(harness.execute(&invocation).await.is_err());
        assert_eq!(harness.calls(), 0);
    }

    #[tokio::test]
    async fn test_paper_and_live_modes() {
        let live = Invocation::new(CommandKind::Live)
            .with("algotext", "pass")
            .with("exchange-name", "binance")
            .with("algo-namespace", "bot")
            .with("quote-currency", "usdt")
            .with("capital-base", "100")
            .with("output", "--");

        let mut harness = Harness::new();
        harness.execute(&live).await.unwrap();
        assert_eq!(harness.stdout(), "Running in paper trading mode.\n");

        let mut harness = Harness::new();
        harness
            .execute(&live.clone().with("simulate-orders", "false"))
            .await
            .unwrap();
        assert_eq!(harness.stdout(), "Running in live trading mode.\n");
    }

    #[tokio::test]
    async fn test_remote_run_prints_id() {
        let mut harness = Harness::new();
        let invocation = backtest(CommandKind::RemoteRun).with("mail", "ops@example.com");
        let outcome = harness.execute(&invocation).await.unwrap();

        assert_eq!(outcome, Outcome::Submitted(JobId::new("job-42")));
        assert_eq!(harness.engine.runs.load(Ordering::SeqCst), 0);
        assert_eq!(harness.remote.transport().submits.load(Ordering::SeqCst), 1);
        assert_eq!(
            harness.stdout(),
            "Running in remote backtesting mode.\njob-42\n"
        );
    }

    #[tokio::test]
    async fn test_remote_status_bare() {
        let mut harness = Harness::new();
        let invocation = Invocation::new(CommandKind::RemoteStatus).with("algo-id", "job-42");
        harness.execute(&invocation).await.unwrap();

        assert_eq!(harness.stdout(), "running\n");
        assert!(harness.err.is_empty());
        assert_eq!(harness.remote.transport().polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_status_detailed_order() {
        let mut harness = Harness::with_status(RemoteStatus::Detailed {
            status: "completed".into(),
            result: Some(PerformanceReport::new(json!({"sharpe": 3.0}))),
            log: Some("algo log".into()),
        });
        let invocation = Invocation::new(CommandKind::RemoteStatus).with("algo-id", "job-42");
        harness.execute(&invocation).await.unwrap();

        let stdout = harness.stdout();
        assert!(stdout.starts_with("the performance data is:\n"));
        assert!(stdout.ends_with("completed\n"));
        assert_eq!(String::from_utf8(harness.err.clone()).unwrap(), "algo log\n");
    }

    #[tokio::test]
    async fn test_ingest_announces_exchange() {
        let mut harness = Harness::new();
        let invocation = Invocation::new(CommandKind::IngestExchange).with("exchange-name", "bittrex");
        assert_eq!(harness.execute(&invocation).await.unwrap(), Outcome::Ingested);

        assert_eq!(harness.stdout(), "Trying to ingest exchange bundle bittrex...\n");
        assert_eq!(harness.engine.ingests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_exchange_never_ingests() {
        let mut harness = Harness::new();
        let invocation = Invocation::new(CommandKind::IngestExchange).with("exchange-name", "unknownxyz");
        assert!(harness.execute(&invocation).await.is_err());
        assert_eq!(harness.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_algofile_is_rejected_before_running() {
        let mut harness = Harness::new();
        let invocation = Invocation::new(CommandKind::Run)
            .with("algofile", "/definitely/not/here.py")
            .with("start", "2017-01-01")
            .with("end", "2017-12-31")
            .with("exchange-name", "poloniex")
            .with("quote-currency", "usdt")
            .with("capital-base", "1000");

        let err = harness.execute(&invocation).await.unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert!(validation.message.contains("--algofile"));
        assert!(harness.stdout().is_empty());
        assert_eq!(harness.calls(), 0);
    }
}
