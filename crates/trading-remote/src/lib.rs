//! Remote backtest submission and status polling.

mod coordinator;
mod http;

pub use coordinator::{publish_status, JobCoordinator, StatusTargets, PERFORMANCE_LABEL};
pub use http::HttpTransport;
