//! Trade Booking Service
//!
//! Trades arrive two ways: from the trade feed through
//! `TradeBookingConnector`, and from executed orders through
//! `BookingListener`, which books each execution as a trade and spreads
//! them over the `TRSY1`..`TRSY3` books in turn.
//!
//! Trade feed layout: `InstrumentId,TradeId,PriceFrac,Book,Quantity,Side`
//! with `Side` either `BUY` or `SELL`.

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use tracing::{debug, info};
use types::errors::ServiceError;
use types::execution::ExecutionOrder;
use types::instrument::BondCatalog;
use types::trade::{Trade, TradeSide};

use backbone::{
    read_records, Connector, InboundConnector, KeyedService, Service, ServiceListener,
    SharedListener,
};

/// Books that executions are allocated to, in rotation.
pub const EXECUTION_BOOKS: [&str; 3] = ["TRSY1", "TRSY2", "TRSY3"];

/// Booked trades keyed by trade id.
pub struct TradeBookingService {
    core: KeyedService<Trade>,
}

impl TradeBookingService {
    pub fn new() -> Self {
        Self {
            core: KeyedService::new("trade-booking"),
        }
    }

    pub fn book_trade(&mut self, trade: Trade) -> Result<(), ServiceError> {
        debug!(
            trade_id = %trade.trade_id,
            instrument = %trade.instrument.id,
            book = %trade.book,
            side = trade.side.label(),
            quantity = trade.quantity,
            "Trade booked"
        );
        self.on_message(trade)
    }

    pub fn len(&self) -> usize {
        self.core.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.store().is_empty()
    }
}

impl Default for TradeBookingService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<str, Trade> for TradeBookingService {
    fn get_data(&self, key: &str) -> Result<&Trade, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: Trade) -> Result<(), ServiceError> {
        self.core.on_message(data)
    }

    fn add_listener(&mut self, listener: SharedListener<Trade>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<Trade>] {
        self.core.listeners()
    }
}

pub struct TradeBookingConnector {
    service: Rc<RefCell<TradeBookingService>>,
    catalog: BondCatalog,
}

impl TradeBookingConnector {
    pub fn new(service: Rc<RefCell<TradeBookingService>>, catalog: BondCatalog) -> Self {
        Self { service, catalog }
    }
}

impl Connector<Trade> for TradeBookingConnector {}

impl InboundConnector<Trade> for TradeBookingConnector {
    /// Fail-stop on the first malformed record.
    fn subscribe<R: BufRead>(&mut self, source: R) -> Result<usize, ServiceError> {
        let delivered = read_records(source, |record| {
            record.expect_len(6)?;
            let instrument = self
                .catalog
                .lookup(record.field(0)?)
                .map_err(|e| ServiceError::format(record.line(), e.to_string()))?;
            let side = record.field(5)?;
            let side = TradeSide::parse(side).ok_or_else(|| {
                ServiceError::format(record.line(), format!("invalid side {:?}", side))
            })?;
            let quantity = record.quantity(4)?;
            if side.signed(quantity).is_none() {
                return Err(ServiceError::format(
                    record.line(),
                    format!("quantity {} out of range", quantity),
                ));
            }

            let trade = Trade::new(
                instrument,
                record.field(1)?,
                record.price(2)?,
                record.field(3)?,
                quantity,
                side,
            );
            self.service.borrow_mut().book_trade(trade)
        })?;

        info!(records = delivered, "Trade feed loaded");
        Ok(delivered)
    }
}

/// Books executed orders as trades.
pub struct BookingListener {
    service: Rc<RefCell<TradeBookingService>>,
    booked: usize,
}

impl BookingListener {
    pub fn new(service: Rc<RefCell<TradeBookingService>>) -> Self {
        Self { service, booked: 0 }
    }

    fn next_book(&mut self) -> &'static str {
        let book = EXECUTION_BOOKS[self.booked % EXECUTION_BOOKS.len()];
        self.booked += 1;
        book
    }
}

impl ServiceListener<ExecutionOrder> for BookingListener {
    fn process_add(&mut self, data: &ExecutionOrder) -> Result<(), ServiceError> {
        let trade = Trade::new(
            data.instrument.clone(),
            data.order_id.clone(),
            data.price,
            self.next_book(),
            data.total_quantity(),
            TradeSide::from_pricing_side(data.side),
        );
        self.service.borrow_mut().book_trade(trade)
    }
}
