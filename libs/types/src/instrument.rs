//! Instruments known to the desk
//!
//! Every record in the pipeline carries a `Bond`. Stages only rely on
//! `Bond::id` being unique within a run; coupon and maturity feed the risk
//! sensitivity table.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Identifier scheme of a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BondIdType {
    Cusip,
    Isin,
}

/// A fixed-coupon bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub id: String,
    pub id_type: BondIdType,
    pub ticker: String,
    /// Annual coupon rate, e.g. `0.0175`.
    pub coupon: Decimal,
    pub maturity: NaiveDate,
}

impl Bond {
    pub fn new(
        id: impl Into<String>,
        id_type: BondIdType,
        ticker: impl Into<String>,
        coupon: Decimal,
        maturity: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            id_type,
            ticker: ticker.into(),
            coupon,
            maturity,
        }
    }

    /// Unique identifier, the natural key of every record about this bond.
    pub fn identifier(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.ticker, self.coupon, self.maturity)
    }
}

/// Closed set of instruments tradable in a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BondCatalog {
    bonds: Vec<Bond>,
}

impl BondCatalog {
    pub fn new(bonds: Vec<Bond>) -> Self {
        Self { bonds }
    }

    /// On-the-run US Treasuries: 2Y, 3Y, 5Y, 7Y, 10Y, 20Y, 30Y.
    pub fn treasuries() -> Self {
        let bond = |id: &str, ticker: &str, coupon: u32, y: i32, m: u32, d: u32| {
            Bond::new(
                id,
                BondIdType::Cusip,
                ticker,
                Decimal::new(coupon as i64, 5),
                NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            )
        };

        Self::new(vec![
            bond("9128283H1", "US2Y", 1750, 2019, 11, 30),
            bond("9128283L2", "US3Y", 1875, 2020, 12, 15),
            bond("912828M80", "US5Y", 2000, 2022, 11, 30),
            bond("9128283J7", "US7Y", 2125, 2024, 11, 30),
            bond("9128283F5", "US10Y", 2250, 2027, 12, 15),
            bond("912810TW8", "US20Y", 2500, 2037, 12, 15),
            bond("912810RZ3", "US30Y", 2750, 2047, 12, 15),
        ])
    }

    /// Resolve an identifier to its bond.
    pub fn lookup(&self, id: &str) -> Result<Bond, ServiceError> {
        self.bonds
            .iter()
            .find(|bond| bond.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(id))
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }
}
