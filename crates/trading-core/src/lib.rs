//! Core types and traits for the trading CLI.
//!
//! This crate provides the foundational building blocks including:
//! - Execution requests (RunRequest, IngestRequest) and their parts
//! - Remote job identifiers and poll outcomes
//! - Performance reports returned by engines and the remote backend
//! - Output destinations for performance data and logs
//! - Traits for the external collaborators: runners, ingesters and remote transports

pub mod types;
pub mod traits;
pub mod error;
pub mod output;

pub use error::{EngineError, TransportError};
pub use output::{Console, ConsoleStream, OutputError, OutputTarget};
pub use types::*;
pub use traits::*;
