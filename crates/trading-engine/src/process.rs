//! Engines driven as child processes.
//!
//! The request is written to the child's stdin as JSON. For runs, stdout must
//! carry the performance data as a single JSON document. The child's stderr is
//! passed through so engine logs and progress stay visible.

use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use trading_core::error::EngineError;
use trading_core::traits::{AlgorithmRunner, BundleIngester};
use trading_core::types::{IngestRequest, PerformanceReport, RunRequest};
use tracing::{debug, info};

/// Program plus fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[derive(Debug, Serialize)]
struct RunJob<'a> {
    request: &'a RunRequest,
    algorithm: &'a str,
}

/// External engine reached through child processes.
pub struct EngineProcess {
    run: Option<EngineCommand>,
    ingest: Option<EngineCommand>,
}

impl EngineProcess {
    pub fn new(run: Option<EngineCommand>, ingest: Option<EngineCommand>) -> Self {
        Self { run, ingest }
    }

    async fn invoke(command: &EngineCommand, payload: Vec<u8>) -> Result<Vec<u8>, EngineError> {
        debug!(program = %command.program, args = ?command.args, "Launching engine");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: command.program.clone(),
                source,
            })?;

        // Feed stdin while stdout is drained so neither pipe can fill up and stall.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&payload).await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                command: command.program.clone(),
                code: output.status.code(),
            });
        }
        match fed {
            // The engine may legitimately exit before reading all of its input.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(program = %command.program, "Engine closed stdin early")
            }
            other => other?,
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl AlgorithmRunner for EngineProcess {
    async fn run(
        &self,
        request: &RunRequest,
        algorithm: &str,
    ) -> Result<PerformanceReport, EngineError> {
        let command = self.run.as_ref().ok_or_else(|| {
            EngineError::NotConfigured("set engine.command to run algorithms locally".into())
        })?;

        let payload = serde_json::to_vec(&RunJob { request, algorithm })?;
        let stdout = Self::invoke(command, payload).await?;
        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(EngineError::Output("no performance data on stdout".into()));
        }

        let data = serde_json::from_slice(&stdout)
            .map_err(|e| EngineError::Output(e.to_string()))?;
        info!(mode = request.mode_label(), "Engine run finished");
        Ok(PerformanceReport::new(data))
    }

    fn name(&self) -> &str {
        self.run.as_ref().map(|c| c.program.as_str()).unwrap_or("unconfigured")
    }
}

#[async_trait]
impl BundleIngester for EngineProcess {
    async fn ingest(&self, request: &IngestRequest) -> Result<(), EngineError> {
        let command = self.ingest.as_ref().ok_or_else(|| {
            EngineError::NotConfigured("set engine.ingest_command to ingest bundles".into())
        })?;

        let payload = serde_json::to_vec(request)?;
        Self::invoke(command, payload).await?;
        info!(exchange = %request.exchange, "Bundle ingestion finished");
        Ok(())
    }

    fn name(&self) -> &str {
        self.ingest.as_ref().map(|c| c.program.as_str()).unwrap_or("unconfigured")
    }
}
