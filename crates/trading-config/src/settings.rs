//! Configuration structures.

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub cli: CliSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub remote: RemoteSettings,
}

/// Command-line surface settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliSettings {
    /// Expose options that only make sense inside an interactive session.
    #[serde(default)]
    pub interactive: bool,
}

/// Local strategy-execution and ingestion engine commands.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineSettings {
    /// Program executing algorithms (request JSON on stdin, performance JSON on stdout).
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Program ingesting exchange bundles (request JSON on stdin).
    pub ingest_command: Option<String>,
    #[serde(default)]
    pub ingest_args: Vec<String>,
}

/// Remote backtesting backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub base_url: String,
    /// Name of the environment variable holding the API token, if any.
    pub api_key_env: Option<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            api_key_env: Some("TRADING_REMOTE_TOKEN".to_string()),
        }
    }
}
