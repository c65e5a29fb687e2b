//! Historical Data Service
//!
//! Terminal stage: remembers the last record per persistence key and hands
//! every record to its outbound connector. Positions and risk are keyed by
//! instrument; executions by order id, so every execution is kept.

use std::cell::RefCell;
use std::rc::Rc;

use types::errors::ServiceError;
use types::execution::ExecutionOrder;
use types::Keyed;

use backbone::{
    Connector, KeyedStore, ListenerRegistry, Service, ServiceEvent, ServiceListener,
    SharedListener,
};

/// Derives the persistence key of a record.
pub type PersistKey<V> = fn(&V) -> String;

/// Persistence key for executions: the order id.
pub fn execution_key(order: &ExecutionOrder) -> String {
    order.order_id.clone()
}

pub struct HistoricalDataService<V, C> {
    records: KeyedStore<V>,
    key: PersistKey<V>,
    connector: C,
    listeners: ListenerRegistry<V>,
}

impl<V, C: Connector<V>> HistoricalDataService<V, C> {
    pub fn with_key(connector: C, key: PersistKey<V>) -> Self {
        Self {
            records: KeyedStore::new(),
            key,
            connector,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Store `data` under `persist_key` and publish it through the connector.
    pub fn persist_data(&mut self, persist_key: String, data: V) -> Result<(), ServiceError> {
        self.connector.publish(&data)?;
        let event = if self.records.contains(&persist_key) {
            ServiceEvent::Update
        } else {
            ServiceEvent::Add
        };
        self.records.insert(persist_key.clone(), data);
        let stored = self.records.get(&persist_key)?;
        self.listeners.notify(event, stored)
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V: Keyed, C: Connector<V>> HistoricalDataService<V, C> {
    /// Persist under the record's natural key.
    pub fn keyed(connector: C) -> Self {
        Self::with_key(connector, V::key)
    }
}

impl<V, C: Connector<V>> Service<str, V> for HistoricalDataService<V, C> {
    fn get_data(&self, key: &str) -> Result<&V, ServiceError> {
        self.records.get(key)
    }

    fn on_message(&mut self, data: V) -> Result<(), ServiceError> {
        let persist_key = (self.key)(&data);
        self.persist_data(persist_key, data)
    }

    fn add_listener(&mut self, listener: SharedListener<V>) {
        self.listeners.add(listener);
    }

    fn listeners(&self) -> &[SharedListener<V>] {
        self.listeners.as_slice()
    }
}

/// Persists every record an upstream service publishes.
pub struct HistoricalDataListener<V, C> {
    service: Rc<RefCell<HistoricalDataService<V, C>>>,
}

impl<V, C> HistoricalDataListener<V, C> {
    pub fn new(service: Rc<RefCell<HistoricalDataService<V, C>>>) -> Self {
        Self { service }
    }
}

impl<V: Clone, C: Connector<V>> ServiceListener<V> for HistoricalDataListener<V, C> {
    fn process_add(&mut self, data: &V) -> Result<(), ServiceError> {
        self.service.borrow_mut().on_message(data.clone())
    }
}
