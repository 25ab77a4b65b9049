//! Trading algorithm CLI application.

mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use cli::dispatch::Dispatcher;
use cli::schema::Capabilities;
use cli::validate::ValidationError;
use cli::Cli;
use trading_config::{load_config, load_extensions, EngineSettings, ExtensionEnv, ExtensionOptions};
use trading_core::output::Console;
use trading_engine::{EngineCommand, EngineProcess};
use trading_monitor::{setup_logging, LogFormat};
use trading_remote::{HttpTransport, JobCoordinator};
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries command output
    setup_logging(cli.log_level.as_str(), LogFormat::from_json_flag(cli.json_logs));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ValidationError>() {
            Some(validation) => {
                eprintln!("{}", validation.usage());
                eprintln!();
                eprintln!("Error: {}", validation);
                ExitCode::from(2)
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let env = ExtensionEnv::from_vars(std::env::vars());
    let options = ExtensionOptions {
        load_default: cli.load_default_extension(),
        paths: cli.extensions.clone(),
        strict: cli.strict_extensions(),
    };
    let extensions = load_extensions(&options, &env).context("Failed to load extensions")?;
    debug!(count = extensions.len(), home = ?env.home(), "Extensions loaded");

    let config = load_config(&cli.config, &extensions)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    let engine = engine_process(&config.engine);
    let token = config
        .remote
        .api_key_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok());
    let transport = HttpTransport::new(config.remote.base_url.clone(), token.as_deref())?;
    let remote = JobCoordinator::new(transport);

    let capabilities = Capabilities {
        interactive: config.cli.interactive,
    };
    let dispatcher = Dispatcher::new(&engine, &engine, &remote, capabilities);

    let invocation = cli.command.invocation();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut console = Console::new(&mut stdout, &mut stderr);
    dispatcher.execute(&invocation, &mut console, Utc::now()).await?;

    Ok(())
}

fn engine_process(settings: &EngineSettings) -> EngineProcess {
    let run = settings
        .command
        .as_ref()
        .map(|program| EngineCommand::new(program.clone(), settings.args.clone()));
    let ingest = settings
        .ingest_command
        .as_ref()
        .map(|program| EngineCommand::new(program.clone(), settings.ingest_args.clone()));
    EngineProcess::new(run, ingest)
}
