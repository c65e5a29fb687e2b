//! Types library for the trading desk pipeline
//!
//! Core type definitions shared by every stage: instruments, market data
//! orders, trades, positions, risk figures and execution intents, plus the
//! fractional price codec and the error taxonomy.
//!
//! # Modules
//! - `ids`: Random alphanumeric identifier generation
//! - `instrument`: Bonds and the instrument catalog
//! - `numeric`: Fractional (32nds/256ths) price notation codec
//! - `order`: Market data orders and top of book
//! - `price`: Mid/spread price quotes
//! - `trade`: Booked trades
//! - `position`: Per-book positions
//! - `risk`: PV01 sensitivities and sector buckets
//! - `execution`: Execution intents
//! - `errors`: Error taxonomy

pub mod ids;
pub mod instrument;
pub mod numeric;
pub mod order;
pub mod price;
pub mod trade;
pub mod position;
pub mod risk;
pub mod execution;
pub mod errors;

/// A record with a natural key, used to upsert it into a keyed store.
pub trait Keyed {
    fn key(&self) -> String;
}
