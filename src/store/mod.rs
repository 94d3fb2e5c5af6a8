use async_trait::async_trait;

use crate::domain::order::{Order, OrderId};

// ============================================================================
// Order Store - ledger of current order values
// ============================================================================
//
// The store is the ground truth for order state. Each id maps to the
// latest `Order` value; writers replace values wholesale and never mutate
// them in place.
//
// Contract every backend must honour:
// - `next_id` is strictly increasing for the life of the process and never
//   hands the same id to two callers.
// - `put` is last-write-wins and atomic: readers see either the old value
//   or the new one, never a mix.
// - `insert_with` allocates an id and stores the order built from it as
//   one step. A caller cancelled while waiting consumes no id.
// - `all` returns an internally consistent snapshot in insertion order.
//   Replacing an order keeps its position. It may lag concurrent writers.
//
// ============================================================================

pub mod memory;

pub use memory::InMemoryOrderStore;

/// Builds the order to store from the id allocated for it.
pub type OrderFactory = Box<dyn FnOnce(OrderId) -> Order + Send>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Allocate a fresh identifier.
    async fn next_id(&self) -> OrderId;

    /// Allocate an id and insert `build(id)` atomically; returns the stored
    /// order.
    async fn insert_with(&self, build: OrderFactory) -> Order;

    /// Insert or replace the order stored under `order.id()`.
    async fn put(&self, order: Order);

    async fn get(&self, id: OrderId) -> Option<Order>;

    /// Snapshot of every stored order in insertion order.
    async fn all(&self) -> Vec<Order>;

    async fn len(&self) -> usize {
        self.all().await.len()
    }
}
