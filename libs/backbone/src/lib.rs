//! Event backbone for the desk pipeline
//!
//! Generic building blocks every stage is assembled from:
//! - `store`: keyed record storage
//! - `service`: the service / listener contract and a reusable keyed service
//! - `connector`: inbound and outbound connectors plus feed line parsing

pub mod connector;
pub mod service;
pub mod store;

pub use connector::{read_records, Connector, InboundConnector, Record};
pub use service::{
    share, KeyedService, ListenerRegistry, Service, ServiceEvent, ServiceListener,
    SharedListener,
};
pub use store::KeyedStore;
