//! Position Service
//!
//! Folds booked trades into per-book signed positions. Listeners see the
//! updated position after every trade.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use types::errors::ServiceError;
use types::position::Position;
use types::trade::Trade;

use backbone::{KeyedService, Service, ServiceListener, SharedListener};

pub struct PositionService {
    core: KeyedService<Position>,
}

impl PositionService {
    pub fn new() -> Self {
        Self {
            core: KeyedService::new("position"),
        }
    }

    /// Add the trade's signed quantity to its book, creating the position on
    /// the first trade for the instrument.
    pub fn add_trade(&mut self, trade: &Trade) -> Result<(), ServiceError> {
        let key = trade.instrument.id.as_str();
        let quantity = trade.signed_quantity()?;
        debug!(
            instrument = key,
            book = %trade.book,
            quantity,
            "Applying trade to position"
        );

        if self.core.store().contains(key) {
            self.core
                .modify(key, |position| position.add(&trade.book, quantity))
        } else {
            let mut position = Position::new(trade.instrument.clone());
            position.add(&trade.book, quantity)?;
            self.core.on_message(position)
        }
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<str, Position> for PositionService {
    fn get_data(&self, key: &str) -> Result<&Position, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: Position) -> Result<(), ServiceError> {
        self.core.on_message(data)
    }

    fn add_listener(&mut self, listener: SharedListener<Position>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<Position>] {
        self.core.listeners()
    }
}

/// Applies every booked trade to positions.
pub struct PositionListener {
    service: Rc<RefCell<PositionService>>,
}

impl PositionListener {
    pub fn new(service: Rc<RefCell<PositionService>>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Trade> for PositionListener {
    fn process_add(&mut self, data: &Trade) -> Result<(), ServiceError> {
        self.service.borrow_mut().add_trade(data)
    }
}
