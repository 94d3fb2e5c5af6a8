pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod store;
pub mod utils;

pub use clients::{RemoteDirectory, RemoteInventory, TransportError};
pub use domain::order::{Amount, Order, OrderError, OrderId, OrderStatistics, OrderStatus};
pub use engine::{OrderEngine, PreflightReport};
pub use store::{InMemoryOrderStore, OrderStore};
