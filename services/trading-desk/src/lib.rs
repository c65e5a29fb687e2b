//! Trading desk runner library: configuration and pipeline wiring.

pub mod config;
pub mod desk;

pub use config::DeskConfig;
pub use desk::{Desk, RunSummary};
