//! Market data order types
//!
//! Resting quotes on a book: one price, one size, one side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a quote on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PricingSide {
    Bid,
    Offer,
}

impl PricingSide {
    pub fn label(&self) -> &'static str {
        match self {
            PricingSide::Bid => "Bid",
            PricingSide::Offer => "Offer",
        }
    }
}

/// A resting quote. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    price: Decimal,
    quantity: u64,
    side: PricingSide,
}

impl Order {
    pub fn new(price: Decimal, quantity: u64, side: PricingSide) -> Self {
        Self {
            price,
            quantity,
            side,
        }
    }

    pub fn bid(price: Decimal, quantity: u64) -> Self {
        Self::new(price, quantity, PricingSide::Bid)
    }

    pub fn offer(price: Decimal, quantity: u64) -> Self {
        Self::new(price, quantity, PricingSide::Offer)
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> PricingSide {
        self.side
    }
}

/// Top of book: best bid and best offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOffer {
    pub bid: Order,
    pub offer: Order,
}

impl BidOffer {
    pub fn new(bid: Order, offer: Order) -> Self {
        Self { bid, offer }
    }

    /// `offer - bid`
    pub fn spread(&self) -> Decimal {
        self.offer.price() - self.bid.price()
    }
}
