//! Execution Service
//!
//! Takes algo executions and routes their orders to the venue. Keeps the
//! latest executed order per instrument and the venue it went to.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use types::errors::ServiceError;
use types::execution::{AlgoExecution, ExecutionOrder, Market};

use backbone::{KeyedService, KeyedStore, Service, ServiceListener, SharedListener};

pub struct ExecutionService {
    core: KeyedService<ExecutionOrder>,
    /// Venue of the latest order per instrument.
    venues: KeyedStore<Market>,
}

impl ExecutionService {
    pub fn new() -> Self {
        Self {
            core: KeyedService::new("execution"),
            venues: KeyedStore::new(),
        }
    }

    /// Venue the instrument's latest order was executed on.
    pub fn market(&self, instrument_id: &str) -> Result<Market, ServiceError> {
        self.venues.get(instrument_id).copied()
    }

    /// Execute an order on `market` and publish it.
    pub fn execute_order(
        &mut self,
        order: ExecutionOrder,
        market: Market,
    ) -> Result<(), ServiceError> {
        info!(
            instrument = %order.instrument.id,
            order_id = %order.order_id,
            side = order.side.label(),
            quantity = order.total_quantity(),
            market = ?market,
            "Order executed"
        );
        self.venues.insert(order.instrument.id.clone(), market);
        self.on_message(order)
    }
}

impl Default for ExecutionService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<str, ExecutionOrder> for ExecutionService {
    fn get_data(&self, key: &str) -> Result<&ExecutionOrder, ServiceError> {
        self.core.get_data(key)
    }

    fn on_message(&mut self, data: ExecutionOrder) -> Result<(), ServiceError> {
        self.core.on_message(data)
    }

    fn add_listener(&mut self, listener: SharedListener<ExecutionOrder>) {
        self.core.add_listener(listener);
    }

    fn listeners(&self) -> &[SharedListener<ExecutionOrder>] {
        self.core.listeners()
    }
}

/// Routes every algo execution to the Execution Service.
pub struct ExecutionListener {
    service: Rc<RefCell<ExecutionService>>,
}

impl ExecutionListener {
    pub fn new(service: Rc<RefCell<ExecutionService>>) -> Self {
        Self { service }
    }
}

impl ServiceListener<AlgoExecution> for ExecutionListener {
    fn process_add(&mut self, data: &AlgoExecution) -> Result<(), ServiceError> {
        self.service
            .borrow_mut()
            .execute_order(data.order.clone(), data.market)
    }
}
