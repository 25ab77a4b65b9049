//! Diagnostics for the trading CLI.

mod logging;

pub use logging::{setup_logging, LogFormat};
