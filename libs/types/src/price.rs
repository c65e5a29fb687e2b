//! Internal price quotes

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::instrument::Bond;
use crate::numeric::price_to_frac;
use crate::Keyed;

/// Mid price and bid/offer spread for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub instrument: Bond,
    pub mid: Decimal,
    pub bid_offer_spread: Decimal,
}

impl Price {
    pub fn new(instrument: Bond, mid: Decimal, bid_offer_spread: Decimal) -> Self {
        Self {
            instrument,
            mid,
            bid_offer_spread,
        }
    }

    /// Derive mid and spread from a two-way quote.
    pub fn from_quote(instrument: Bond, bid: Decimal, ask: Decimal) -> Self {
        Self::new(instrument, (bid + ask) / Decimal::from(2), ask - bid)
    }
}

impl Keyed for Price {
    fn key(&self) -> String {
        self.instrument.id.clone()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.instrument.identifier(),
            price_to_frac(self.mid),
            self.bid_offer_spread.normalize()
        )
    }
}
