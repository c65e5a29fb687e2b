//! Execution stages of the desk pipeline
//!
//! ```text
//! OrderBook ──► AlgoExecutionService ──► ExecutionService ──► TradeBookingService
//!               (spread ≤ 1/128)          (venue routing)       ▲
//!                                                               │
//!                                trades.txt ── TradeBookingConnector
//! ```

pub mod algo;
pub mod booking;
pub mod config;
pub mod execution;

pub use algo::{AlgoExecutionListener, AlgoExecutionService, Decision, TIGHTEST_SPREAD};
pub use booking::{BookingListener, TradeBookingConnector, TradeBookingService};
pub use config::AlgoConfig;
pub use execution::{ExecutionListener, ExecutionService};
