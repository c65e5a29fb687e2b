//! Per-instrument order book snapshot
//!
//! A book is replaced wholesale on every feed update; there is no
//! incremental order tracking. Aggregation groups each stack by exact price
//! using a `BTreeMap`, so the aggregated stacks come out best-first:
//! bids descending, offers ascending.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::ServiceError;
use types::instrument::Bond;
use types::order::{BidOffer, Order, PricingSide};
use types::Keyed;

/// Bid and offer stacks for one instrument.
///
/// Every order in `bid_stack` is a bid and every order in `offer_stack` is
/// an offer; the constructors assign the side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub instrument: Bond,
    bid_stack: Vec<Order>,
    offer_stack: Vec<Order>,
}

impl OrderBook {
    /// Book with no quotes on either side.
    pub fn empty(instrument: Bond) -> Self {
        Self {
            instrument,
            bid_stack: Vec::new(),
            offer_stack: Vec::new(),
        }
    }

    /// Build a book from `(price, quantity)` levels, best-to-worst as given.
    pub fn from_levels(
        instrument: Bond,
        bids: &[(Decimal, u64)],
        offers: &[(Decimal, u64)],
    ) -> Self {
        Self {
            instrument,
            bid_stack: bids.iter().map(|&(p, q)| Order::bid(p, q)).collect(),
            offer_stack: offers.iter().map(|&(p, q)| Order::offer(p, q)).collect(),
        }
    }

    pub fn bid_stack(&self) -> &[Order] {
        &self.bid_stack
    }

    pub fn offer_stack(&self) -> &[Order] {
        &self.offer_stack
    }

    /// Keep at most `depth` levels per side.
    pub fn truncated(mut self, depth: usize) -> Self {
        self.bid_stack.truncate(depth);
        self.offer_stack.truncate(depth);
        self
    }

    /// Merge orders at the same price into one order carrying the summed
    /// quantity.
    ///
    /// Fails with `QuantityOverflow` when a merged size exceeds `u64`.
    pub fn aggregated(&self) -> Result<Self, ServiceError> {
        let overflow = || ServiceError::overflow(&self.instrument.id);
        Ok(Self {
            instrument: self.instrument.clone(),
            bid_stack: aggregate_stack(&self.bid_stack, PricingSide::Bid).ok_or_else(overflow)?,
            offer_stack: aggregate_stack(&self.offer_stack, PricingSide::Offer)
                .ok_or_else(overflow)?,
        })
    }

    /// Highest bid and lowest offer.
    ///
    /// Fails with `EmptyBook` when either stack is empty.
    pub fn best_bid_offer(&self) -> Result<BidOffer, ServiceError> {
        let empty = || ServiceError::EmptyBook {
            instrument: self.instrument.id.clone(),
        };
        let bid = self
            .bid_stack
            .iter()
            .max_by_key(|o| o.price())
            .ok_or_else(empty)?;
        let offer = self
            .offer_stack
            .iter()
            .min_by_key(|o| o.price())
            .ok_or_else(empty)?;
        Ok(BidOffer::new(*bid, *offer))
    }
}

impl Keyed for OrderBook {
    fn key(&self) -> String {
        self.instrument.id.clone()
    }
}

/// Group a stack by price and sum the quantities, best price first.
///
/// `None` when a level's summed quantity overflows.
pub fn aggregate_stack(stack: &[Order], side: PricingSide) -> Option<Vec<Order>> {
    let mut levels: BTreeMap<Decimal, u64> = BTreeMap::new();
    for order in stack {
        let level = levels.entry(order.price()).or_insert(0);
        *level = level.checked_add(order.quantity())?;
    }

    let to_order = |(price, quantity): (Decimal, u64)| Order::new(price, quantity, side);
    Some(match side {
        PricingSide::Bid => levels.into_iter().rev().map(to_order).collect(),
        PricingSide::Offer => levels.into_iter().map(to_order).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use types::instrument::BondCatalog;
    use types::numeric::price_from_ticks;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn bond() -> Bond {
        BondCatalog::treasuries().lookup("9128283H1").unwrap()
    }

    #[test]
    fn test_aggregation_merges_duplicate_prices() {
        let book = OrderBook::from_levels(
            bond(),
            &[(dec("99.5"), 10), (dec("99.25"), 5), (dec("99.5"), 7)],
            &[(dec("99.75"), 3), (dec("100"), 4), (dec("99.75"), 1)],
        );

        let aggregated = book.aggregated().unwrap();

        assert_eq!(
            aggregated.bid_stack(),
            &[Order::bid(dec("99.5"), 17), Order::bid(dec("99.25"), 5)]
        );
        assert_eq!(
            aggregated.offer_stack(),
            &[Order::offer(dec("99.75"), 4), Order::offer(dec("100"), 4)]
        );
    }

    #[test]
    fn test_aggregation_overflow_is_an_error() {
        let book = OrderBook::from_levels(
            bond(),
            &[(dec("99.5"), u64::MAX), (dec("99.5"), 1)],
            &[(dec("99.75"), 1)],
        );
        assert_eq!(
            book.aggregated().unwrap_err(),
            ServiceError::overflow("9128283H1")
        );

        let at_limit = OrderBook::from_levels(
            bond(),
            &[(dec("99.5"), u64::MAX - 1), (dec("99.5"), 1)],
            &[(dec("99.75"), 1)],
        );
        assert_eq!(
            at_limit.aggregated().unwrap().bid_stack(),
            &[Order::bid(dec("99.5"), u64::MAX)]
        );
    }

    #[test]
    fn test_best_bid_offer_ignores_feed_order() {
        let book = OrderBook::from_levels(
            bond(),
            &[(dec("99.25"), 5), (dec("99.5"), 10)],
            &[(dec("100"), 4), (dec("99.75"), 3)],
        );

        let bbo = book.best_bid_offer().unwrap();

        assert_eq!(bbo.bid, Order::bid(dec("99.5"), 10));
        assert_eq!(bbo.offer, Order::offer(dec("99.75"), 3));
        assert_eq!(bbo.spread(), dec("0.25"));
    }

    #[test]
    fn test_empty_side_is_empty_book() {
        let book = OrderBook::from_levels(bond(), &[(dec("99.5"), 10)], &[]);
        assert_eq!(
            book.best_bid_offer().unwrap_err(),
            ServiceError::EmptyBook {
                instrument: "9128283H1".to_string()
            }
        );
        assert!(OrderBook::empty(bond()).best_bid_offer().is_err());
    }

    #[test]
    fn test_truncated_keeps_leading_levels() {
        let book = OrderBook::from_levels(
            bond(),
            &[(dec("99.5"), 1), (dec("99.4"), 2), (dec("99.3"), 3)],
            &[(dec("99.6"), 1)],
        )
        .truncated(2);

        assert_eq!(book.bid_stack().len(), 2);
        assert_eq!(book.bid_stack()[1], Order::bid(dec("99.4"), 2));
        assert_eq!(book.offer_stack().len(), 1);
    }

    #[test]
    fn test_sides_assigned_by_stack() {
        let book = OrderBook::from_levels(bond(), &[(dec("99"), 1)], &[(dec("100"), 1)]);
        assert!(book.bid_stack().iter().all(|o| o.side() == PricingSide::Bid));
        assert!(book.offer_stack().iter().all(|o| o.side() == PricingSide::Offer));
    }

    fn levels() -> impl Strategy<Value = Vec<(Decimal, u64)>> {
        prop::collection::vec(
            (25_000u64..26_000, 1u64..10_000_000).prop_map(|(t, q)| (price_from_ticks(t), q)),
            1..12,
        )
    }

    proptest! {
        #[test]
        fn prop_aggregation_is_idempotent(bids in levels(), offers in levels()) {
            let once = OrderBook::from_levels(bond(), &bids, &offers).aggregated().unwrap();
            let twice = once.aggregated().unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_aggregation_preserves_total_size(bids in levels(), offers in levels()) {
            let book = OrderBook::from_levels(bond(), &bids, &offers);
            let aggregated = book.aggregated().unwrap();
            let total = |s: &[Order]| s.iter().map(|o| o.quantity()).sum::<u64>();
            prop_assert_eq!(total(book.bid_stack()), total(aggregated.bid_stack()));
            prop_assert_eq!(total(book.offer_stack()), total(aggregated.offer_stack()));
        }

        #[test]
        fn prop_best_bid_offer_dominates_stacks(bids in levels(), offers in levels()) {
            let book = OrderBook::from_levels(bond(), &bids, &offers);
            let bbo = book.best_bid_offer().unwrap();
            for order in book.bid_stack() {
                prop_assert!(bbo.bid.price() >= order.price());
            }
            for order in book.offer_stack() {
                prop_assert!(bbo.offer.price() <= order.price());
            }
            let merged = book.aggregated().unwrap().best_bid_offer().unwrap();
            prop_assert_eq!(bbo.bid.price(), merged.bid.price());
            prop_assert_eq!(bbo.offer.price(), merged.offer.price());
        }
    }
}
