//! Pricing Service and the price feed connector
//!
//! Price feed layout: `Timestamp,InstrumentId,BidFrac,AskFrac`. Each record
//! becomes a `Price` carrying the mid and the bid/offer spread.

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use tracing::{debug, info};
use types::errors::ServiceError;
use types::instrument::BondCatalog;
use types::price::Price;

use backbone::{read_records, Connector, InboundConnector, KeyedService, Service, SharedListener};

/// Latest internal price per instrument.
pub struct PricingService {
    core: KeyedService<Price>,
}

impl PricingService {
    pub fn new() -> Self {
        Self {
            core: KeyedService::new("pricing"),
        }
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<str, Price> for PricingService {
    fn get_data(&self, key: &str) -> Result<&Price, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: Price) -> Result<(), ServiceError> {
        self.core.on_message(data)
    }

    fn add_listener(&mut self, listener: SharedListener<Price>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<Price>] {
        self.core.listeners()
    }
}

pub struct PricingConnector {
    service: Rc<RefCell<PricingService>>,
    catalog: BondCatalog,
}

impl PricingConnector {
    pub fn new(service: Rc<RefCell<PricingService>>, catalog: BondCatalog) -> Self {
        Self { service, catalog }
    }
}

impl Connector<Price> for PricingConnector {}

impl InboundConnector<Price> for PricingConnector {
    /// Fail-stop on the first malformed record.
    fn subscribe<R: BufRead>(&mut self, source: R) -> Result<usize, ServiceError> {
        let delivered = read_records(source, |record| {
            record.expect_len(4)?;
            let instrument = self
                .catalog
                .lookup(record.field(1)?)
                .map_err(|e| ServiceError::format(record.line(), e.to_string()))?;
            let price = Price::from_quote(instrument, record.price(2)?, record.price(3)?);

            debug!(
                line = record.line(),
                instrument = %price.instrument.id,
                mid = %price.mid,
                spread = %price.bid_offer_spread,
                "Price record"
            );
            self.service.borrow_mut().on_message(price)
        })?;

        info!(records = delivered, "Price feed loaded");
        Ok(delivered)
    }
}
