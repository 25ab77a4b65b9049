//! Error types for the external collaborators.

use thiserror::Error;

/// Errors raised by the strategy-execution and bundle-ingestion engines.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to launch engine '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine '{command}' exited with status {code:?}")]
    Failed { command: String, code: Option<i32> },

    #[error("Engine produced unreadable output: {0}")]
    Output(String),

    #[error("Failed to read algorithm file '{path}': {source}")]
    AlgorithmFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the remote job transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}
