//! Algo execution decisioning
//!
//! Runs once per order book update. When the top of book is at its
//! tightest (spread ≤ 1/128) the algo crosses the spread with a market
//! order, alternating sides on successive orders:
//!
//! - even count: Bid side, pays the best offer, sized by the best bid
//! - odd count: Offer side, hits the best bid, sized by the best offer
//!
//! The counter only advances when an order is emitted, so two consecutive
//! qualifying books always produce orders on opposite sides.

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::debug;
use types::errors::ServiceError;
use types::execution::{AlgoExecution, ExecutionOrder, Market, OrderType};
use types::ids::IdGenerator;
use types::order::{BidOffer, PricingSide};

use backbone::{KeyedService, Service, ServiceListener, SharedListener};
use market_data::OrderBook;

use crate::config::AlgoConfig;

/// Widest spread the algo will cross: 1/128 of a point.
pub const TIGHTEST_SPREAD: Decimal = Decimal::from_parts(78125, 0, 0, false, 7);

const ORDER_ID_PREFIX: &str = "Algo";
const ORDER_ID_LEN: usize = 11;
const PARENT_ID_PREFIX: &str = "AlgoParent";
const PARENT_ID_LEN: usize = 5;

/// Outcome of one decisioning cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Cross the spread on `side` at `price` for `quantity`.
    Aggress {
        side: PricingSide,
        price: Decimal,
        quantity: u64,
    },
    /// One side of the book has no quote.
    NoQuote,
    /// Spread wider than `TIGHTEST_SPREAD`.
    TooWide { spread: Decimal },
}

/// Side, price and size for the `count`-th order given a top of book.
pub fn decide(bbo: &BidOffer, count: u64) -> Decision {
    let spread = bbo.spread();
    if spread > TIGHTEST_SPREAD {
        return Decision::TooWide { spread };
    }

    if count % 2 == 0 {
        Decision::Aggress {
            side: PricingSide::Bid,
            price: bbo.offer.price(),
            quantity: bbo.bid.quantity(),
        }
    } else {
        Decision::Aggress {
            side: PricingSide::Offer,
            price: bbo.bid.price(),
            quantity: bbo.offer.quantity(),
        }
    }
}

/// Latest algo execution per instrument.
pub struct AlgoExecutionService {
    core: KeyedService<AlgoExecution>,
    ids: IdGenerator,
    market: Market,
    /// Orders emitted so far. Drives side alternation; never reset.
    emitted: u64,
}

impl AlgoExecutionService {
    pub fn new(config: AlgoConfig) -> Self {
        Self {
            core: KeyedService::new("algo-execution"),
            ids: IdGenerator::with_seed(config.seed),
            market: Market::BrokerTec,
            emitted: 0,
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Run one decisioning cycle on a book and emit an order if it qualifies.
    ///
    /// An empty side or a wide spread is not an error: nothing is emitted
    /// and the outcome is returned.
    pub fn execute(&mut self, book: &OrderBook) -> Result<Decision, ServiceError> {
        let instrument = &book.instrument;
        let decision = match book.best_bid_offer() {
            Ok(bbo) => decide(&bbo, self.emitted),
            Err(ServiceError::EmptyBook { .. }) => Decision::NoQuote,
            Err(e) => return Err(e),
        };

        let Decision::Aggress {
            side,
            price,
            quantity,
        } = decision
        else {
            debug!(instrument = %instrument.id, decision = ?decision, "No algo signal");
            return Ok(decision);
        };

        let order = ExecutionOrder {
            instrument: instrument.clone(),
            side,
            order_id: self.ids.prefixed(ORDER_ID_PREFIX, ORDER_ID_LEN),
            order_type: OrderType::Market,
            price,
            visible_quantity: quantity,
            hidden_quantity: 0,
            parent_order_id: self.ids.prefixed(PARENT_ID_PREFIX, PARENT_ID_LEN),
            is_child_order: false,
        };
        self.emitted += 1;

        debug!(
            instrument = %instrument.id,
            order_id = %order.order_id,
            side = side.label(),
            price = %price,
            quantity,
            count = self.emitted,
            "Algo order emitted"
        );
        self.on_message(AlgoExecution::new(order, self.market))?;
        Ok(decision)
    }
}

impl Service<str, AlgoExecution> for AlgoExecutionService {
    fn get_data(&self, key: &str) -> Result<&AlgoExecution, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: AlgoExecution) -> Result<(), ServiceError> {
        self.core.on_message(data)
    }

    fn add_listener(&mut self, listener: SharedListener<AlgoExecution>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<AlgoExecution>] {
        self.core.listeners()
    }
}

/// Feeds every published order book into the algo.
pub struct AlgoExecutionListener {
    service: Rc<RefCell<AlgoExecutionService>>,
}

impl AlgoExecutionListener {
    pub fn new(service: Rc<RefCell<AlgoExecutionService>>) -> Self {
        Self { service }
    }
}

impl ServiceListener<OrderBook> for AlgoExecutionListener {
    fn process_add(&mut self, data: &OrderBook) -> Result<(), ServiceError> {
        self.service.borrow_mut().execute(data).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use types::instrument::{Bond, BondCatalog};
    use types::numeric::price_from_ticks;
    use types::order::Order;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn bond() -> Bond {
        BondCatalog::treasuries().lookup("9128283J7").unwrap()
    }

    fn seeded() -> AlgoExecutionService {
        AlgoExecutionService::new(AlgoConfig { seed: Some(7) })
    }

    fn book(bid: &str, bid_qty: u64, offer: &str, offer_qty: u64) -> OrderBook {
        OrderBook::from_levels(bond(), &[(dec(bid), bid_qty)], &[(dec(offer), offer_qty)])
    }

    #[test]
    fn test_threshold_constant() {
        assert_eq!(TIGHTEST_SPREAD, Decimal::ONE / Decimal::from(128));
    }

    #[test]
    fn test_spread_exactly_threshold_emits() {
        let mut service = seeded();
        let decision = service
            .execute(&book("99.5", 1_000_000, "99.5078125", 2_000_000))
            .unwrap();

        assert_eq!(
            decision,
            Decision::Aggress {
                side: PricingSide::Bid,
                price: dec("99.5078125"),
                quantity: 1_000_000,
            }
        );
        let execution = service.get_data("9128283J7").unwrap();
        assert_eq!(execution.market, Market::BrokerTec);
        assert_eq!(execution.order.order_type, OrderType::Market);
        assert_eq!(execution.order.hidden_quantity, 0);
        assert!(!execution.order.is_child_order);
        assert_eq!(service.emitted(), 1);
    }

    #[test]
    fn test_wide_spread_emits_nothing() {
        let mut service = seeded();
        let decision = service
            .execute(&book("99.5", 1_000_000, "99.51171875", 1_000_000))
            .unwrap();

        assert_eq!(
            decision,
            Decision::TooWide {
                spread: dec("0.01171875")
            }
        );
        assert!(service.get_data("9128283J7").is_err());
        assert_eq!(service.emitted(), 0);
    }

    #[test]
    fn test_empty_book_is_no_signal() {
        let mut service = seeded();
        let empty = OrderBook::from_levels(bond(), &[(dec("99.5"), 1)], &[]);

        assert_eq!(service.execute(&empty).unwrap(), Decision::NoQuote);
        assert_eq!(service.emitted(), 0);
    }

    #[test]
    fn test_consecutive_triggers_alternate_sides() {
        let mut service = seeded();
        let tight = book("99.5", 1_000_000, "99.50390625", 3_000_000);

        service.execute(&tight).unwrap();
        let first = service.get_data("9128283J7").unwrap().order.clone();
        // a wide book in between does not advance the alternation
        service
            .execute(&book("99", 1, "100", 1))
            .unwrap();
        service.execute(&tight).unwrap();
        let second = service.get_data("9128283J7").unwrap().order.clone();

        assert_eq!(first.side, PricingSide::Bid);
        assert_eq!(first.price, dec("99.50390625"));
        assert_eq!(first.visible_quantity, 1_000_000);
        assert_eq!(second.side, PricingSide::Offer);
        assert_eq!(second.price, dec("99.5"));
        assert_eq!(second.visible_quantity, 3_000_000);
        assert_ne!(first.order_id, second.order_id);
    }

    #[test]
    fn test_order_id_shape() {
        let mut service = seeded();
        service
            .execute(&book("99.5", 1, "99.5", 1))
            .unwrap();
        let order = &service.get_data("9128283J7").unwrap().order;

        assert!(order.order_id.starts_with("Algo"));
        assert_eq!(order.order_id.len(), 15);
        assert!(order.parent_order_id.starts_with("AlgoParent"));
        assert_eq!(order.parent_order_id.len(), 15);
    }

    #[test]
    fn test_seeded_ids_reproducible() {
        let tight = book("99.5", 1, "99.5", 1);
        let mut a = seeded();
        let mut b = seeded();
        a.execute(&tight).unwrap();
        b.execute(&tight).unwrap();
        assert_eq!(
            a.get_data("9128283J7").unwrap().order.order_id,
            b.get_data("9128283J7").unwrap().order.order_id
        );
    }

    #[test]
    fn test_listener_drives_service() {
        let service = Rc::new(RefCell::new(seeded()));
        let mut listener = AlgoExecutionListener::new(service.clone());

        listener
            .process_add(&book("99.5", 1, "99.5078125", 1))
            .unwrap();
        listener
            .process_update(&book("99.5", 1, "99.5078125", 1))
            .unwrap();

        assert_eq!(service.borrow().emitted(), 2);
    }

    proptest! {
        #[test]
        fn prop_threshold_decides_emission(
            bid_ticks in 25_000u64..26_000,
            gap in 0u64..8,
            count in 0u64..1_000,
        ) {
            let bbo = BidOffer::new(
                Order::bid(price_from_ticks(bid_ticks), 10),
                Order::offer(price_from_ticks(bid_ticks + gap), 20),
            );
            let decision = decide(&bbo, count);
            if gap <= 2 {
                let expected_side = if count % 2 == 0 { PricingSide::Bid } else { PricingSide::Offer };
                let is_expected_side =
                    matches!(decision, Decision::Aggress { side, .. } if side == expected_side);
                prop_assert!(is_expected_side);
            } else {
                let is_too_wide = matches!(decision, Decision::TooWide { .. });
                prop_assert!(is_too_wide);
            }
        }
    }
}
