//! Historical persistence for the desk pipeline
//!
//! - `historical`: the Historical Data Service, a terminal stage that keeps
//!   the last record per key and publishes each one outward
//! - `sink`: the append-only file connector it publishes through

pub mod historical;
pub mod sink;

pub use historical::{execution_key, HistoricalDataListener, HistoricalDataService, PersistKey};
pub use sink::{FileSink, FlushPolicy, SinkConfig};
