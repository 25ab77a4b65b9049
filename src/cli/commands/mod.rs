//! CLI command implementations.

pub mod ingest;
pub mod remote;
pub mod run;
