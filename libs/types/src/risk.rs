//! Risk records
//!
//! PV01 is the price change of a bond for a one basis point rise in yield.
//! A `Pv01` record pairs a unit sensitivity with the quantity it applies to,
//! either for one bond or for a bucket of bonds.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::instrument::{Bond, BondCatalog};
use crate::Keyed;

/// A named group of instruments whose risk is reported together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketedSector {
    pub name: String,
    pub products: Vec<Bond>,
}

impl BucketedSector {
    pub fn new(name: impl Into<String>, products: Vec<Bond>) -> Self {
        Self {
            name: name.into(),
            products,
        }
    }

    pub fn contains(&self, instrument_id: &str) -> bool {
        self.products.iter().any(|b| b.id == instrument_id)
    }

    /// FrontEnd (2Y, 3Y), Belly (5Y, 7Y, 10Y), LongEnd (20Y, 30Y).
    pub fn treasury_buckets(catalog: &BondCatalog) -> Result<Vec<Self>, ServiceError> {
        let layout: [(&str, &[&str]); 3] = [
            ("FrontEnd", &["9128283H1", "9128283L2"]),
            ("Belly", &["912828M80", "9128283J7", "9128283F5"]),
            ("LongEnd", &["912810TW8", "912810RZ3"]),
        ];

        layout
            .iter()
            .map(|(name, ids)| {
                let products = ids
                    .iter()
                    .map(|id| catalog.lookup(id))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::new(*name, products))
            })
            .collect()
    }
}

/// PV01 of a product: unit sensitivity and the quantity it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pv01<P> {
    pub product: P,
    /// Sensitivity per unit of quantity.
    pub pv01: Decimal,
    pub quantity: i64,
}

impl<P> Pv01<P> {
    pub fn new(product: P, pv01: Decimal, quantity: i64) -> Self {
        Self {
            product,
            pv01,
            quantity,
        }
    }

    /// `pv01 × quantity`
    pub fn exposure(&self) -> Decimal {
        self.pv01 * Decimal::from(self.quantity)
    }
}

impl Keyed for Pv01<Bond> {
    fn key(&self) -> String {
        self.product.id.clone()
    }
}

impl Keyed for Pv01<BucketedSector> {
    fn key(&self) -> String {
        self.product.name.clone()
    }
}

impl fmt::Display for Pv01<Bond> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.product.identifier(),
            self.pv01.round_dp(6),
            self.quantity,
            self.exposure().round_dp(6)
        )
    }
}

impl fmt::Display for Pv01<BucketedSector> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.product.name,
            self.pv01.round_dp(6),
            self.quantity,
            self.exposure().round_dp(6)
        )
    }
}
