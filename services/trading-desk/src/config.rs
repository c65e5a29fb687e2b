//! Desk configuration
//!
//! Loaded from an optional JSON file; command line flags override the
//! directories. Every field has a default, so `{}` is a valid file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use execution_engine::AlgoConfig;
use market_data::MarketDataConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Directory holding `prices.txt`, `marketdata.txt` and `trades.txt`.
    pub data_dir: PathBuf,
    /// Directory receiving `positions.txt`, `risk.txt` and `executions.txt`.
    pub result_dir: PathBuf,
    pub market_data: MarketDataConfig,
    pub algo: AlgoConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            result_dir: PathBuf::from("result"),
            market_data: MarketDataConfig::default(),
            algo: AlgoConfig::default(),
        }
    }
}

impl DeskConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config JSON in {}", path.display()))
    }
}
