//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Rendering of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Setup logging with the given level.
///
/// Records go to stderr; stdout is reserved for command output such as
/// performance data and job ids. `RUST_LOG` takes precedence over `level`.
pub fn setup_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(err) = installed {
        eprintln!("logging already initialised: {}", err);
    }
}
