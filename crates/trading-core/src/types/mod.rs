//! Core data types for the trading CLI.

mod exchange;
mod frequency;
mod job;
mod report;
mod request;

pub use exchange::KNOWN_EXCHANGES;
pub use frequency::{DataFrequency, FrequencySet};
pub use job::{JobId, RemoteStatus};
pub use report::PerformanceReport;
pub use request::{
    AlgoSource, AuthAlias, BacktestParams, Define, IngestRequest, IngestSource, LiveParams,
    RunMode, RunRequest,
};
