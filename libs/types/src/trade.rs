//! Booked trade types

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::instrument::Bond;
use crate::numeric::price_to_frac;
use crate::order::PricingSide;
use crate::Keyed;

/// Direction of a booked trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Parse the feed encoding (`BUY` / `SELL`).
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "BUY" => Some(TradeSide::Buy),
            "SELL" => Some(TradeSide::Sell),
            _ => None,
        }
    }

    /// Buying lifts the offer, selling hits the bid.
    pub fn from_pricing_side(side: PricingSide) -> Self {
        match side {
            PricingSide::Bid => TradeSide::Buy,
            PricingSide::Offer => TradeSide::Sell,
        }
    }

    /// `+quantity` for buys, `-quantity` for sells. `None` above `i64::MAX`.
    pub fn signed(&self, quantity: u64) -> Option<i64> {
        let quantity = i64::try_from(quantity).ok()?;
        match self {
            TradeSide::Buy => Some(quantity),
            TradeSide::Sell => Some(-quantity),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// A trade booked into a named book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub instrument: Bond,
    pub trade_id: String,
    pub price: Decimal,
    pub book: String,
    pub quantity: u64,
    pub side: TradeSide,
}

impl Trade {
    pub fn new(
        instrument: Bond,
        trade_id: impl Into<String>,
        price: Decimal,
        book: impl Into<String>,
        quantity: u64,
        side: TradeSide,
    ) -> Self {
        Self {
            instrument,
            trade_id: trade_id.into(),
            price,
            book: book.into(),
            quantity,
            side,
        }
    }

    /// Quantity with the sign of the trade direction.
    pub fn signed_quantity(&self) -> Result<i64, ServiceError> {
        self.side
            .signed(self.quantity)
            .ok_or_else(|| ServiceError::overflow(&self.instrument.id))
    }
}

impl Keyed for Trade {
    fn key(&self) -> String {
        self.trade_id.clone()
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.instrument.identifier(),
            self.trade_id,
            price_to_frac(self.price),
            self.book,
            self.quantity,
            self.side.label()
        )
    }
}
