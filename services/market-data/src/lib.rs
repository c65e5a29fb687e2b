//! Market data stages of the desk pipeline
//!
//! - `pricing`: internal mid/spread prices from the price feed
//! - `order_book`: per-instrument book snapshots, aggregation and top of book
//! - `service`: the order book engine that publishes books to listeners
//! - `ingestion`: the order book feed connector
//!
//! ```text
//! prices.txt ──► PricingConnector ──► PricingService
//!
//! marketdata.txt ──► MarketDataConnector ──► MarketDataService ──► listeners
//!                                             (truncate, aggregate)
//! ```

pub mod config;
pub mod ingestion;
pub mod order_book;
pub mod pricing;
pub mod service;

pub use config::MarketDataConfig;
pub use ingestion::MarketDataConnector;
pub use order_book::OrderBook;
pub use pricing::{PricingConnector, PricingService};
pub use service::MarketDataService;
