//! Validated execution requests.

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{DataFrequency, FrequencySet};
use crate::error::EngineError;

/// Where the algorithm script comes from. Exactly one source per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AlgoSource {
    /// Inline script text.
    Text(String),
    /// Path of a script file, read when the run starts.
    File(PathBuf),
}

impl AlgoSource {
    /// Read the script text.
    pub fn load(&self) -> Result<String, EngineError> {
        match self {
            AlgoSource::Text(text) => Ok(text.clone()),
            AlgoSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| EngineError::AlgorithmFile {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
}

/// A `name=expression` binding spliced into the algorithm namespace.
///
/// Bindings are applied in order, so later ones may refer to earlier names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Define {
    pub name: String,
    pub expression: String,
}

impl FromStr for Define {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, expression) = s
            .split_once('=')
            .ok_or_else(|| format!("failed to parse '{}' as a define", s))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("failed to parse '{}' as a define", s));
        }
        Ok(Self {
            name: name.to_string(),
            expression: expression.to_string(),
        })
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.expression)
    }
}

/// Authentication file alias for one exchange (`binance` + `auth2` → `auth2.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAlias {
    pub exchange: String,
    pub alias: String,
}

impl AuthAlias {
    /// Parse a flat `exchange,alias,exchange,alias,...` list.
    pub fn parse_list(s: &str) -> Result<Vec<AuthAlias>, String> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() % 2 != 0 || parts.iter().any(|p| p.is_empty()) {
            return Err(format!(
                "invalid auth aliases '{}', expected pairs like 'binance,auth2'",
                s
            ));
        }
        Ok(parts
            .chunks(2)
            .map(|pair| AuthAlias {
                exchange: pair[0].to_string(),
                alias: pair[1].to_string(),
            })
            .collect())
    }
}

/// Parameters that only exist for historical simulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestParams {
    pub data_frequency: DataFrequency,
    /// Data bundle to simulate against.
    pub bundle: String,
    /// Use bundle data ingested on or before this instant.
    pub bundle_timestamp: DateTime<Utc>,
}

/// Parameters that only exist for live execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveParams {
    pub live_graph: bool,
    /// Paper trading: orders never reach the exchange.
    pub simulate_orders: bool,
    pub auth_aliases: Vec<AuthAlias>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RunMode {
    Backtest(BacktestParams),
    Live(LiveParams),
}

/// A fully validated request to execute an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub algorithm: AlgoSource,
    pub defines: Vec<Define>,
    pub capital_base: Decimal,
    /// Targeted exchange(s); free-form for runs.
    pub exchange: String,
    pub algo_namespace: Option<String>,
    pub quote_currency: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub mode: RunMode,
    /// Destination token for the performance data.
    pub output: String,
    pub print_algo: bool,
    /// Resolve algorithm functions in the caller's namespace (interactive sessions only).
    pub local_namespace: Option<bool>,
}

impl RunRequest {
    /// Human-readable execution mode.
    pub fn mode_label(&self) -> &'static str {
        match &self.mode {
            RunMode::Backtest(_) => "backtesting",
            RunMode::Live(live) if live.simulate_orders => "paper trading",
            RunMode::Live(_) => "live trading",
        }
    }
}

/// What an ingestion reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum IngestSource {
    /// Fetch from the exchange, filtered by range and symbols.
    Exchange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        include_symbols: Vec<String>,
        exclude_symbols: Vec<String>,
    },
    /// Ingest every row of a local CSV file.
    Csv { path: PathBuf },
}

impl IngestSource {
    /// Build an exchange source, defaulting `end` to `now` and `start` to one
    /// year before `end`.
    pub fn exchange(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        include_symbols: Vec<String>,
        exclude_symbols: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let end = end.unwrap_or(now);
        let start = start.unwrap_or_else(|| {
            end.checked_sub_months(Months::new(12))
                .unwrap_or(end - Duration::days(365))
        });
        IngestSource::Exchange {
            start,
            end,
            include_symbols,
            exclude_symbols,
        }
    }
}

/// A fully validated request to ingest an exchange bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub exchange: String,
    pub data_frequency: FrequencySet,
    pub source: IngestSource,
    pub show_progress: bool,
    /// Progress indicator for every currency pair.
    pub verbose: bool,
    /// Report anomalies found in the bundle.
    pub validate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_define_parse() {
        let define = Define::from_str("fast = 10").unwrap();
        assert_eq!(define.name, "fast");
        assert_eq!(define.expression, " 10");

        let nested = Define::from_str("expr=a==b").unwrap();
        assert_eq!(nested.expression, "a==b");

        assert!(Define::from_str("novalue").is_err());
        assert!(Define::from_str("=5").is_err());
    }

    #[test]
    fn test_auth_alias_parse() {
        let aliases = AuthAlias::parse_list("binance,auth2,bittrex,auth3").unwrap();
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases[1].exchange, "bittrex");
        assert_eq!(aliases[1].alias, "auth3");

        assert!(AuthAlias::parse_list("binance").is_err());
        assert!(AuthAlias::parse_list("binance,").is_err());
    }

    #[test]
    fn test_mode_label() {
        let mut request = RunRequest {
            algorithm: AlgoSource::Text("pass".into()),
            defines: vec![],
            capital_base: dec!(1000),
            exchange: "binance".into(),
            algo_namespace: Some("ns".into()),
            quote_currency: "usdt".into(),
            start: None,
            end: None,
            mode: RunMode::Live(LiveParams {
                live_graph: false,
                simulate_orders: true,
                auth_aliases: vec![],
            }),
            output: "-".into(),
            print_algo: false,
            local_namespace: None,
        };
        assert_eq!(request.mode_label(), "paper trading");

        request.mode = RunMode::Live(LiveParams {
            live_graph: false,
            simulate_orders: false,
            auth_aliases: vec![],
        });
        assert_eq!(request.mode_label(), "live trading");
    }

    #[test]
    fn test_ingest_default_range() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        match IngestSource::exchange(None, None, vec![], vec![], now) {
            IngestSource::Exchange { start, end, .. } => {
                assert_eq!(end, now);
                assert_eq!(start, Utc.with_ymd_and_hms(2023, 3, 15, 12, 0, 0).unwrap());
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_algo_source_load_missing_file() {
        let source = AlgoSource::File(PathBuf::from("/definitely/not/here.py"));
        assert!(matches!(
            source.load(),
            Err(EngineError::AlgorithmFile { .. })
        ));
    }
}
