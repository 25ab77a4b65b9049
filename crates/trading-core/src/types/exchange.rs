//! Exchanges with ingestible data bundles.

/// Exchanges the bundle ingestion engine knows how to fetch.
pub const KNOWN_EXCHANGES: &[&str] = &["binance", "bitfinex", "bittrex", "poloniex"];
