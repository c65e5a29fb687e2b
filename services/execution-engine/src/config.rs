//! Algo configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgoConfig {
    /// Seed for order id generation. `None` draws from OS entropy.
    pub seed: Option<u64>,
}
