//! Traits for the external collaborators.

mod ingester;
mod runner;
mod transport;

pub use ingester::BundleIngester;
pub use runner::AlgorithmRunner;
pub use transport::RemoteTransport;
