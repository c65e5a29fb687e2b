//! Service / listener contract
//!
//! A service owns a keyed store and accepts inbound records through
//! `on_message`. After each mutation it notifies its listeners in
//! registration order. Delivery is synchronous: a listener's callback,
//! including any downstream `on_message` it triggers, completes before the
//! next listener runs.
//!
//! Listeners are shared handles (`Rc<RefCell<_>>`). The pipeline is a DAG
//! and runs on one thread, so a service is never re-entered while it is
//! notifying.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use types::errors::ServiceError;
use types::Keyed;

use crate::store::KeyedStore;

/// Kind of change a listener is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceEvent {
    Add,
    Update,
    Remove,
}

/// Callbacks for changes to one service's records.
///
/// The record is only borrowed for the duration of the call.
pub trait ServiceListener<V> {
    fn process_add(&mut self, data: &V) -> Result<(), ServiceError>;

    /// Defaults to `process_add`: pipeline stages react to a replaced
    /// record exactly as to a new one.
    fn process_update(&mut self, data: &V) -> Result<(), ServiceError> {
        self.process_add(data)
    }

    fn process_remove(&mut self, _data: &V) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Shared handle to a registered listener.
pub type SharedListener<V> = Rc<RefCell<dyn ServiceListener<V>>>;

/// Wrap a listener into a shareable handle.
pub fn share<V, L>(listener: L) -> SharedListener<V>
where
    L: ServiceListener<V> + 'static,
{
    Rc::new(RefCell::new(listener))
}

/// A stage: keyed lookup plus the single inbound mutation entry point.
pub trait Service<K: ?Sized, V> {
    /// Fails with `NotFound` when `key` is absent.
    fn get_data(&self, key: &K) -> Result<&V, ServiceError>;

    /// Upsert `data` by its natural key, then notify every listener.
    fn on_message(&mut self, data: V) -> Result<(), ServiceError>;

    /// Registrations last for the life of the process.
    fn add_listener(&mut self, listener: SharedListener<V>);

    /// Registered listeners in insertion order.
    fn listeners(&self) -> &[SharedListener<V>];
}

/// Ordered set of listeners on one service.
pub struct ListenerRegistry<V> {
    listeners: Vec<SharedListener<V>>,
}

impl<V> ListenerRegistry<V> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: SharedListener<V>) {
        self.listeners.push(listener);
    }

    pub fn as_slice(&self) -> &[SharedListener<V>] {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in registration order.
    ///
    /// Stops at the first listener error; earlier listeners keep their
    /// effects.
    pub fn notify(&self, event: ServiceEvent, data: &V) -> Result<(), ServiceError> {
        for listener in &self.listeners {
            let mut listener = listener.borrow_mut();
            match event {
                ServiceEvent::Add => listener.process_add(data)?,
                ServiceEvent::Update => listener.process_update(data)?,
                ServiceEvent::Remove => listener.process_remove(data)?,
            }
        }
        Ok(())
    }
}

impl<V> Default for ListenerRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Store plus listeners: the generic body of a keyed service.
///
/// Stages embed this and add their own operations on top.
pub struct KeyedService<V> {
    name: &'static str,
    store: KeyedStore<V>,
    listeners: ListenerRegistry<V>,
}

impl<V: Keyed> KeyedService<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            store: KeyedStore::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn store(&self) -> &KeyedStore<V> {
        &self.store
    }

    /// Mutate a stored record in place and notify `Update` with the result.
    ///
    /// An error from `f` is returned as is and nothing is notified.
    pub fn modify<F>(&mut self, key: &str, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut V) -> Result<(), ServiceError>,
    {
        f(self.store.get_mut(key)?)?;
        let record = self.store.get(key)?;
        self.listeners.notify(ServiceEvent::Update, record)
    }

    /// Drop a record and notify `Remove`.
    pub fn remove(&mut self, key: &str) -> Result<V, ServiceError> {
        let record = self.store.remove(key)?;
        debug!(service = self.name, key, "Record removed");
        self.listeners.notify(ServiceEvent::Remove, &record)?;
        Ok(record)
    }
}

impl<V: Keyed> Service<str, V> for KeyedService<V> {
    fn get_data(&self, key: &str) -> Result<&V, ServiceError> {
        self.store.get(key)
    }

    fn on_message(&mut self, data: V) -> Result<(), ServiceError> {
        let key = data.key();
        let event = if self.store.contains(&key) {
            ServiceEvent::Update
        } else {
            ServiceEvent::Add
        };

        debug!(
            service = self.name,
            key = %key,
            event = ?event,
            listeners = self.listeners.len(),
            "Record upserted"
        );

        self.store.insert(key.clone(), data);
        let record = self.store.get(&key)?;
        self.listeners.notify(event, record)
    }

    fn add_listener(&mut self, listener: SharedListener<V>) {
        self.listeners.add(listener);
    }

    fn listeners(&self) -> &[SharedListener<V>] {
        self.listeners.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tick {
        id: String,
        value: i64,
    }

    impl Keyed for Tick {
        fn key(&self) -> String {
            self.id.clone()
        }
    }

    fn tick(id: &str, value: i64) -> Tick {
        Tick {
            id: id.to_string(),
            value,
        }
    }

    /// Records every callback into a shared journal.
    struct Recorder {
        tag: &'static str,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl ServiceListener<Tick> for Recorder {
        fn process_add(&mut self, data: &Tick) -> Result<(), ServiceError> {
            self.journal
                .borrow_mut()
                .push(format!("{}:add:{}={}", self.tag, data.id, data.value));
            Ok(())
        }

        fn process_update(&mut self, data: &Tick) -> Result<(), ServiceError> {
            self.journal
                .borrow_mut()
                .push(format!("{}:update:{}={}", self.tag, data.id, data.value));
            Ok(())
        }

        fn process_remove(&mut self, data: &Tick) -> Result<(), ServiceError> {
            self.journal
                .borrow_mut()
                .push(format!("{}:remove:{}", self.tag, data.id));
            Ok(())
        }
    }

    struct Failing;

    impl ServiceListener<Tick> for Failing {
        fn process_add(&mut self, data: &Tick) -> Result<(), ServiceError> {
            Err(ServiceError::not_found(data.id.clone()))
        }
    }

    /// Only implements `process_add`; relies on the defaults.
    struct AddOnly {
        seen: Rc<RefCell<Vec<i64>>>,
    }

    impl ServiceListener<Tick> for AddOnly {
        fn process_add(&mut self, data: &Tick) -> Result<(), ServiceError> {
            self.seen.borrow_mut().push(data.value);
            Ok(())
        }
    }

    #[test]
    fn test_get_data_not_found() {
        let service: KeyedService<Tick> = KeyedService::new("ticks");
        assert_eq!(
            service.get_data("X").unwrap_err(),
            ServiceError::not_found("X")
        );
    }

    #[test]
    fn test_add_then_update_events() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut service = KeyedService::new("ticks");
        service.add_listener(share(Recorder {
            tag: "r",
            journal: journal.clone(),
        }));

        service.on_message(tick("A", 1)).unwrap();
        service.on_message(tick("A", 2)).unwrap();

        assert_eq!(*journal.borrow(), vec!["r:add:A=1", "r:update:A=2"]);
        assert_eq!(service.get_data("A").unwrap().value, 2);
    }

    #[test]
    fn test_listeners_notified_in_registration_order() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut service = KeyedService::new("ticks");
        for tag in ["first", "second", "third"] {
            service.add_listener(share(Recorder {
                tag,
                journal: journal.clone(),
            }));
        }

        service.on_message(tick("A", 1)).unwrap();

        assert_eq!(
            *journal.borrow(),
            vec!["first:add:A=1", "second:add:A=1", "third:add:A=1"]
        );
        assert_eq!(service.listeners().len(), 3);
    }

    #[test]
    fn test_listener_error_stops_fan_out_but_keeps_record() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut service = KeyedService::new("ticks");
        service.add_listener(share(Recorder {
            tag: "before",
            journal: journal.clone(),
        }));
        service.add_listener(share(Failing));
        service.add_listener(share(Recorder {
            tag: "after",
            journal: journal.clone(),
        }));

        let err = service.on_message(tick("A", 1)).unwrap_err();

        assert_eq!(err, ServiceError::not_found("A"));
        assert_eq!(*journal.borrow(), vec!["before:add:A=1"]);
        assert!(service.get_data("A").is_ok());
    }

    #[test]
    fn test_update_defaults_to_add() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut service = KeyedService::new("ticks");
        service.add_listener(share(AddOnly { seen: seen.clone() }));

        service.on_message(tick("A", 1)).unwrap();
        service.on_message(tick("A", 5)).unwrap();
        service.remove("A").unwrap();

        assert_eq!(*seen.borrow(), vec![1, 5]);
    }

    #[test]
    fn test_modify_and_remove() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut service = KeyedService::new("ticks");
        service.add_listener(share(Recorder {
            tag: "r",
            journal: journal.clone(),
        }));

        service.on_message(tick("A", 1)).unwrap();
        service
            .modify("A", |t| {
                t.value += 10;
                Ok(())
            })
            .unwrap();
        service.remove("A").unwrap();

        assert_eq!(
            *journal.borrow(),
            vec!["r:add:A=1", "r:update:A=11", "r:remove:A"]
        );
        assert!(service.modify("A", |_| Ok(())).is_err());
    }

    #[test]
    fn test_failed_modify_notifies_nothing() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut service = KeyedService::new("ticks");
        service.add_listener(share(Recorder {
            tag: "r",
            journal: journal.clone(),
        }));
        service.on_message(tick("A", 1)).unwrap();

        let err = service
            .modify("A", |_| Err(ServiceError::overflow("A")))
            .unwrap_err();

        assert_eq!(err, ServiceError::overflow("A"));
        assert_eq!(*journal.borrow(), vec!["r:add:A=1"]);
    }

    #[test]
    fn test_chained_services_deliver_depth_first() {
        // upstream -> relay -> downstream, plus a second upstream listener
        struct Relay {
            downstream: Rc<RefCell<KeyedService<Tick>>>,
            journal: Rc<RefCell<Vec<String>>>,
        }

        impl ServiceListener<Tick> for Relay {
            fn process_add(&mut self, data: &Tick) -> Result<(), ServiceError> {
                self.journal.borrow_mut().push(format!("relay:{}", data.id));
                self.downstream
                    .borrow_mut()
                    .on_message(tick(&data.id, data.value * 10))
            }
        }

        let journal = Rc::new(RefCell::new(Vec::new()));
        let downstream = Rc::new(RefCell::new(KeyedService::new("downstream")));
        downstream.borrow_mut().add_listener(share(Recorder {
            tag: "down",
            journal: journal.clone(),
        }));

        let mut upstream = KeyedService::new("upstream");
        upstream.add_listener(share(Relay {
            downstream: downstream.clone(),
            journal: journal.clone(),
        }));
        upstream.add_listener(share(Recorder {
            tag: "up",
            journal: journal.clone(),
        }));

        upstream.on_message(tick("A", 3)).unwrap();

        assert_eq!(
            *journal.borrow(),
            vec!["relay:A", "down:add:A=30", "up:add:A=3"]
        );
        assert_eq!(downstream.borrow().get_data("A").unwrap().value, 30);
    }
}
