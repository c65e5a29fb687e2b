//! Market data configuration

use serde::{Deserialize, Serialize};

/// Configuration for the order book engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Levels ingested per side on every update.
    pub book_depth: usize,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self { book_depth: 5 }
    }
}
