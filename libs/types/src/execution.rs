//! Execution intent types

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::instrument::Bond;
use crate::numeric::price_to_frac;
use crate::order::PricingSide;
use crate::Keyed;

/// Order type of an execution intent. The algo only sends market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
}

impl OrderType {
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
        }
    }
}

/// Execution venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    BrokerTec,
}

/// An order to be sent to a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOrder {
    pub instrument: Bond,
    pub side: PricingSide,
    pub order_id: String,
    pub order_type: OrderType,
    pub price: Decimal,
    pub visible_quantity: u64,
    pub hidden_quantity: u64,
    pub parent_order_id: String,
    pub is_child_order: bool,
}

impl ExecutionOrder {
    /// Visible plus hidden quantity.
    pub fn total_quantity(&self) -> u64 {
        self.visible_quantity + self.hidden_quantity
    }
}

impl Keyed for ExecutionOrder {
    fn key(&self) -> String {
        self.instrument.id.clone()
    }
}

impl fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{}",
            self.instrument.identifier(),
            self.order_id,
            self.side.label(),
            self.order_type.label(),
            price_to_frac(self.price),
            self.visible_quantity,
            self.hidden_quantity,
            self.parent_order_id,
            if self.is_child_order { "True" } else { "False" }
        )
    }
}

/// An execution order routed to a market by the algo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgoExecution {
    pub order: ExecutionOrder,
    pub market: Market,
}

impl AlgoExecution {
    pub fn new(order: ExecutionOrder, market: Market) -> Self {
        Self { order, market }
    }
}

impl Keyed for AlgoExecution {
    fn key(&self) -> String {
        self.order.key()
    }
}
