//! Order book feed connector
//!
//! Record layout: `Timestamp,InstrumentId` followed by `depth` groups of
//! `BidPrice,BidSize,AskPrice,AskSize`, best level first. Prices are in
//! fractional notation.

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::{debug, info};
use types::errors::ServiceError;
use types::instrument::BondCatalog;

use backbone::{read_records, Connector, InboundConnector, Record};

use crate::order_book::OrderBook;
use crate::service::MarketDataService;

const FIELDS_PER_LEVEL: usize = 4;

pub struct MarketDataConnector {
    service: Rc<RefCell<MarketDataService>>,
    catalog: BondCatalog,
}

impl MarketDataConnector {
    pub fn new(service: Rc<RefCell<MarketDataService>>, catalog: BondCatalog) -> Self {
        Self { service, catalog }
    }

    fn parse_levels(
        record: &Record,
        depth: usize,
    ) -> Result<(Vec<(Decimal, u64)>, Vec<(Decimal, u64)>), ServiceError> {
        let mut bids = Vec::with_capacity(depth);
        let mut offers = Vec::with_capacity(depth);
        for level in 0..depth {
            let base = 2 + FIELDS_PER_LEVEL * level;
            bids.push((record.price(base)?, record.quantity(base + 1)?));
            offers.push((record.price(base + 2)?, record.quantity(base + 3)?));
        }
        Ok((bids, offers))
    }
}

impl Connector<OrderBook> for MarketDataConnector {}

impl InboundConnector<OrderBook> for MarketDataConnector {
    /// Fail-stop: a malformed line or unknown instrument aborts the load;
    /// books published before it stay in place.
    fn subscribe<R: BufRead>(&mut self, source: R) -> Result<usize, ServiceError> {
        let depth = self.service.borrow().book_depth();
        let expected = 2 + FIELDS_PER_LEVEL * depth;

        let delivered = read_records(source, |record| {
            record.expect_len(expected)?;
            let instrument = self
                .catalog
                .lookup(record.field(1)?)
                .map_err(|e| ServiceError::format(record.line(), e.to_string()))?;
            let (bids, offers) = Self::parse_levels(&record, depth)?;

            debug!(
                line = record.line(),
                instrument = %instrument.id,
                "Order book record"
            );
            self.service.borrow_mut().update(instrument, &bids, &offers)
        })?;

        info!(records = delivered, depth, "Order book feed loaded");
        Ok(delivered)
    }
}
