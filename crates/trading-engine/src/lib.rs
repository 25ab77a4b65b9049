//! Adapters to the external strategy-execution and ingestion engines.

mod process;

pub use process::{EngineCommand, EngineProcess};
