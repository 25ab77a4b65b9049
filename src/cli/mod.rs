//! CLI definitions.
//!
//! clap only shapes the command line; every value is handed to the schema
//! validator as raw text so that all commands share one set of diagnostics.

pub mod commands;
pub mod dispatch;
pub mod request;
pub mod schema;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use schema::CommandKind;
use validate::Invocation;

#[derive(Parser)]
#[command(name = "trading")]
#[command(author, version, about = "Run, submit and monitor trading algorithms")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Extension file to load (repeatable)
    #[arg(short = 'e', long = "extension")]
    pub extensions: Vec<PathBuf>,

    /// Abort when an extension fails to load
    #[arg(long, overrides_with = "non_strict_extensions")]
    pub strict_extensions: bool,

    /// Log extension failures and keep going
    #[arg(long, overrides_with = "strict_extensions")]
    pub non_strict_extensions: bool,

    /// Load extension.toml from the trading home directory
    #[arg(long, overrides_with = "no_default_extension")]
    pub default_extension: bool,

    /// Skip the default extension file
    #[arg(long, overrides_with = "default_extension")]
    pub no_default_extension: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Lenient unless `--strict-extensions` was given last.
    pub fn strict_extensions(&self) -> bool {
        self.strict_extensions
    }

    /// The default extension is loaded unless `--no-default-extension` was given last.
    pub fn load_default_extension(&self) -> bool {
        !self.no_default_extension
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest of an algorithm
    Run(RunArgs),
    /// Trade an algorithm live, or paper trade it
    Live(LiveArgs),
    /// Submit a backtest to the remote backend
    RemoteRun(RemoteRunArgs),
    /// Fetch the status of a remote backtest
    RemoteStatus(RemoteStatusArgs),
    /// Ingest exchange data into a bundle
    IngestExchange(IngestArgs),
}

/// Options shared by every command that executes an algorithm.
#[derive(clap::Args)]
pub struct AlgoArgs {
    /// File containing the algorithm to run
    #[arg(short = 'f', long)]
    pub algofile: Option<PathBuf>,

    /// Algorithm script text
    #[arg(short = 't', long)]
    pub algotext: Option<String>,

    /// Bind a name in the algorithm namespace, e.g. `-D fast=10` (repeatable)
    #[arg(short = 'D', long = "define")]
    pub defines: Vec<String>,

    /// Starting capital of the algorithm
    #[arg(long)]
    pub capital_base: Option<String>,

    /// Exchange name(s) to target
    #[arg(short = 'x', long)]
    pub exchange_name: Option<String>,

    /// Algorithm name, used to persist its state
    #[arg(short = 'n', long)]
    pub algo_namespace: Option<String>,

    /// Quote currency of the portfolio
    #[arg(short = 'c', long)]
    pub quote_currency: Option<String>,

    /// Print the algorithm to stdout before running it
    #[arg(long)]
    pub print_algo: bool,

    #[arg(long, hide = true, overrides_with = "no_local_namespace")]
    pub local_namespace: bool,

    #[arg(long, hide = true, overrides_with = "local_namespace")]
    pub no_local_namespace: bool,
}

/// Options of historical simulations.
#[derive(clap::Args)]
pub struct SimulationArgs {
    /// Bar frequency: daily or minute
    #[arg(long)]
    pub data_frequency: Option<String>,

    /// Data bundle to simulate against
    #[arg(short = 'b', long)]
    pub bundle: Option<String>,

    /// Use bundle data ingested on or before this date
    #[arg(long)]
    pub bundle_timestamp: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(short = 'e', long)]
    pub end: Option<String>,
}

#[derive(clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub algo: AlgoArgs,

    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Where to write performance data: `-` for stdout, `--` to skip, or a file path
    #[arg(short = 'o', long, allow_hyphen_values = true)]
    pub output: Option<String>,
}

#[derive(clap::Args)]
pub struct LiveArgs {
    #[command(flatten)]
    pub algo: AlgoArgs,

    /// Start date (YYYY-MM-DD)
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(short = 'e', long)]
    pub end: Option<String>,

    /// Where to write performance data: `-` for stdout, `--` to skip, or a file path
    #[arg(short = 'o', long, allow_hyphen_values = true)]
    pub output: Option<String>,

    /// Display live charts of the algorithm
    #[arg(long)]
    pub live_graph: bool,

    /// Simulate orders instead of sending them to the exchange (default)
    #[arg(long, overrides_with = "no_simulate_orders")]
    pub simulate_orders: bool,

    /// Send orders to the exchange
    #[arg(long, overrides_with = "simulate_orders")]
    pub no_simulate_orders: bool,

    /// Authentication file aliases, e.g. `binance,auth2,bittrex,auth3`
    #[arg(long)]
    pub auth_aliases: Option<String>,
}

#[derive(clap::Args)]
pub struct RemoteRunArgs {
    #[command(flatten)]
    pub algo: AlgoArgs,

    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Address notified when the backtest finishes
    #[arg(short = 'm', long)]
    pub mail: Option<String>,
}

#[derive(clap::Args)]
pub struct RemoteStatusArgs {
    /// Identifier returned by remote-run
    #[arg(short = 'i', long)]
    pub algo_id: Option<String>,

    /// Where to write performance data: `-` for stdout, `--` to skip, or a file path
    #[arg(short = 'd', long, allow_hyphen_values = true)]
    pub data_output: Option<String>,

    /// Where to write the algorithm log: `-` for stderr, `--` to skip, or a file path
    #[arg(short = 'l', long, allow_hyphen_values = true)]
    pub log_output: Option<String>,
}

#[derive(clap::Args)]
pub struct IngestArgs {
    /// Exchange to ingest
    #[arg(short = 'x', long)]
    pub exchange_name: Option<String>,

    /// Bar frequencies: daily, minute or daily,minute
    #[arg(short = 'f', long)]
    pub data_frequency: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(short = 'e', long)]
    pub end: Option<String>,

    /// Only ingest these symbols (comma-separated)
    #[arg(short = 'i', long)]
    pub include_symbols: Option<String>,

    /// Skip these symbols (comma-separated)
    #[arg(long)]
    pub exclude_symbols: Option<String>,

    /// Ingest a CSV file instead of fetching from the exchange
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Show progress (default)
    #[arg(long, overrides_with = "no_show_progress")]
    pub show_progress: bool,

    /// Hide progress
    #[arg(long, overrides_with = "show_progress")]
    pub no_show_progress: bool,

    /// Show progress for every currency pair
    #[arg(long)]
    pub verbose: bool,

    /// Report potential anomalies in the bundle
    #[arg(long)]
    pub validate: bool,
}

impl AlgoArgs {
    fn record(&self, invocation: &mut Invocation) {
        invocation.path("algofile", self.algofile.as_ref());
        invocation.text("algotext", self.algotext.as_ref());
        invocation.many("define", &self.defines);
        invocation.text("capital-base", self.capital_base.as_ref());
        invocation.text("exchange-name", self.exchange_name.as_ref());
        invocation.text("algo-namespace", self.algo_namespace.as_ref());
        invocation.text("quote-currency", self.quote_currency.as_ref());
        invocation.flag_pair("print-algo", self.print_algo, false);
        invocation.flag_pair("local-namespace", self.local_namespace, self.no_local_namespace);
    }
}

impl SimulationArgs {
    fn record(&self, invocation: &mut Invocation) {
        invocation.text("data-frequency", self.data_frequency.as_ref());
        invocation.text("bundle", self.bundle.as_ref());
        invocation.text("bundle-timestamp", self.bundle_timestamp.as_ref());
        invocation.text("start", self.start.as_ref());
        invocation.text("end", self.end.as_ref());
    }
}

impl Commands {
    /// The raw invocation handed to the validator.
    pub fn invocation(&self) -> Invocation {
        match self {
            Commands::Run(args) => {
                let mut invocation = Invocation::new(CommandKind::Run);
                args.algo.record(&mut invocation);
                args.simulation.record(&mut invocation);
                invocation.text("output", args.output.as_ref());
                invocation
            }
            Commands::Live(args) => {
                let mut invocation = Invocation::new(CommandKind::Live);
                args.algo.record(&mut invocation);
                invocation.text("start", args.start.as_ref());
                invocation.text("end", args.end.as_ref());
                invocation.text("output", args.output.as_ref());
                invocation.flag_pair("live-graph", args.live_graph, false);
                invocation.flag_pair("simulate-orders", args.simulate_orders, args.no_simulate_orders);
                invocation.text("auth-aliases", args.auth_aliases.as_ref());
                invocation
            }
            Commands::RemoteRun(args) => {
                let mut invocation = Invocation::new(CommandKind::RemoteRun);
                args.algo.record(&mut invocation);
                args.simulation.record(&mut invocation);
                invocation.text("mail", args.mail.as_ref());
                invocation
            }
            Commands::RemoteStatus(args) => {
                let mut invocation = Invocation::new(CommandKind::RemoteStatus);
                invocation.text("algo-id", args.algo_id.as_ref());
                invocation.text("data-output", args.data_output.as_ref());
                invocation.text("log-output", args.log_output.as_ref());
                invocation
            }
            Commands::IngestExchange(args) => {
                let mut invocation = Invocation::new(CommandKind::IngestExchange);
                invocation.text("exchange-name", args.exchange_name.as_ref());
                invocation.text("data-frequency", args.data_frequency.as_ref());
                invocation.text("start", args.start.as_ref());
                invocation.text("end", args.end.as_ref());
                invocation.text("include-symbols", args.include_symbols.as_ref());
                invocation.text("exclude-symbols", args.exclude_symbols.as_ref());
                invocation.path("csv", args.csv.as_ref());
                invocation.flag_pair("show-progress", args.show_progress, args.no_show_progress);
                invocation.flag_pair("verbose", args.verbose, false);
                invocation.flag_pair("validate", args.validate, false);
                invocation
            }
        }
    }
}
