//! Market Data Service (order book engine)
//!
//! Holds the latest aggregated book per instrument. Each update replaces the
//! instrument's stacks, truncates them to the configured depth, merges
//! duplicate price levels and then notifies listeners with the result.

use rust_decimal::Decimal;
use tracing::{debug, info};
use types::errors::ServiceError;
use types::instrument::Bond;
use types::order::BidOffer;

use backbone::{KeyedService, Service, SharedListener};

use crate::config::MarketDataConfig;
use crate::order_book::OrderBook;

pub struct MarketDataService {
    core: KeyedService<OrderBook>,
    config: MarketDataConfig,
}

impl MarketDataService {
    pub fn new(config: MarketDataConfig) -> Self {
        info!(book_depth = config.book_depth, "MarketDataService initialized");
        Self {
            core: KeyedService::new("market-data"),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MarketDataConfig::default())
    }

    pub fn book_depth(&self) -> usize {
        self.config.book_depth
    }

    /// Replace an instrument's book with the supplied levels and publish it.
    ///
    /// Levels are best-to-worst as delivered by the feed; anything past the
    /// configured depth is dropped.
    pub fn update(
        &mut self,
        instrument: Bond,
        bids: &[(Decimal, u64)],
        offers: &[(Decimal, u64)],
    ) -> Result<(), ServiceError> {
        self.on_message(OrderBook::from_levels(instrument, bids, offers))
    }

    /// Best bid and offer for an instrument.
    ///
    /// `NotFound` when no book has been published for the instrument yet;
    /// `EmptyBook` when one of its stacks is empty.
    pub fn best_bid_offer(&self, instrument_id: &str) -> Result<BidOffer, ServiceError> {
        self.core.get_data(instrument_id)?.best_bid_offer()
    }

    /// The instrument's book with duplicate price levels merged.
    pub fn aggregate_depth(&self, instrument_id: &str) -> Result<OrderBook, ServiceError> {
        self.core.get_data(instrument_id)?.aggregated()
    }

    pub fn len(&self) -> usize {
        self.core.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.store().is_empty()
    }
}

impl Service<str, OrderBook> for MarketDataService {
    fn get_data(&self, key: &str) -> Result<&OrderBook, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: OrderBook) -> Result<(), ServiceError> {
        let book = data.truncated(self.config.book_depth).aggregated()?;
        debug!(
            instrument = %book.instrument.id,
            bid_levels = book.bid_stack().len(),
            offer_levels = book.offer_stack().len(),
            "Order book updated"
        );
        self.core.on_message(book)
    }

    fn add_listener(&mut self, listener: SharedListener<OrderBook>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<OrderBook>] {
        self.core.listeners()
    }
}
