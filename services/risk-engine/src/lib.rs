//! Position and risk stages of the desk pipeline
//!
//! - `position`: per-book positions folded from booked trades
//! - `exposure`: unit PV01 per instrument and exposure sums
//! - `engine`: the Risk Service and sector bucketing

pub mod engine;
pub mod exposure;
pub mod position;

pub use engine::{RiskListener, RiskService};
pub use exposure::SensitivityTable;
pub use position::{PositionListener, PositionService};
