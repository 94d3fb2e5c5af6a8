use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{OrderFactory, OrderStore};
use crate::domain::order::{Order, OrderId};

/// Volatile store keeping orders in insertion order.
///
/// `insert_with` takes the write lock before touching the id counter, so an
/// id is only consumed once its order is certain to be stored, and ids,
/// `created_at` stamps and insertion order all agree. Reads share the lock.
pub struct InMemoryOrderStore {
    next_id: AtomicU64,
    ledger: RwLock<Ledger>,
}

#[derive(Default)]
struct Ledger {
    positions: HashMap<OrderId, usize>,
    orders: Vec<Order>,
}

impl Ledger {
    fn upsert(&mut self, order: Order) {
        let id = order.id();
        match self.positions.get(&id) {
            Some(&position) => {
                self.orders[position] = order;
                tracing::trace!(order_id = %id, "Replaced stored order");
            }
            None => {
                self.positions.insert(id, self.orders.len());
                self.orders.push(order);
                tracing::trace!(order_id = %id, "Inserted order");
            }
        }
    }
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ledger: RwLock::new(Ledger::default()),
        }
    }

    fn allocate(&self) -> OrderId {
        OrderId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn next_id(&self) -> OrderId {
        self.allocate()
    }

    async fn insert_with(&self, build: OrderFactory) -> Order {
        let mut ledger = self.ledger.write().await;
        // nothing below awaits, so the id and the insert cannot be split
        let order = build(self.allocate());
        ledger.upsert(order.clone());
        order
    }

    async fn put(&self, order: Order) {
        self.ledger.write().await.upsert(order);
    }

    async fn get(&self, id: OrderId) -> Option<Order> {
        let ledger = self.ledger.read().await;
        ledger
            .positions
            .get(&id)
            .map(|&position| ledger.orders[position].clone())
    }

    async fn all(&self) -> Vec<Order> {
        self.ledger.read().await.orders.clone()
    }

    async fn len(&self) -> usize {
        self.ledger.read().await.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, OrderStatus};
    use futures_util::FutureExt;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn order(id: OrderId) -> Order {
        Order::new(id, "CUST001", Amount::new(dec!(10.00)).unwrap())
    }

    fn factory() -> OrderFactory {
        Box::new(order)
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let store = InMemoryOrderStore::new();

        assert_eq!(store.next_id().await, OrderId(1));
        assert_eq!(store.next_id().await, OrderId(2));
        assert_eq!(store.insert_with(factory()).await.id(), OrderId(3));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.get(OrderId(999)).await.is_none());
    }

    #[tokio::test]
    async fn test_insert_with_stores_built_order() {
        let store = InMemoryOrderStore::new();

        let inserted = store.insert_with(factory()).await;

        assert_eq!(inserted.id(), OrderId(1));
        assert_eq!(store.get(OrderId(1)).await, Some(inserted));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_cancelled_insert_consumes_no_id() {
        let store = InMemoryOrderStore::new();

        // a reader holds the lock, so the insert cannot complete on first poll
        let reader = store.ledger.read().await;
        assert!(store.insert_with(factory()).now_or_never().is_none());
        drop(reader);

        assert_eq!(store.len().await, 0);
        assert_eq!(store.insert_with(factory()).await.id(), OrderId(1));
    }

    #[tokio::test]
    async fn test_put_replaces_existing_value() {
        let store = InMemoryOrderStore::new();
        let original = store.insert_with(factory()).await;

        store.put(original.with_status(OrderStatus::Cancelled)).await;

        let stored = store.get(original.id()).await.unwrap();
        assert_eq!(stored.status(), OrderStatus::Cancelled);
        assert_eq!(stored.created_at(), original.created_at());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_all_is_in_insertion_order() {
        let store = InMemoryOrderStore::new();
        let first = store.next_id().await;
        let second = store.next_id().await;

        store.put(order(second)).await;
        store.put(order(first)).await;
        // replacing keeps the original position
        store.put(order(second).with_status(OrderStatus::Completed)).await;

        let ids: Vec<OrderId> = store.all().await.iter().map(Order::id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_agree_with_insertion_order() {
        let store = Arc::new(InMemoryOrderStore::new());
        let mut handles = Vec::new();

        for _ in 0..200 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.insert_with(factory()).await.id() }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 200);

        let all = store.all().await;
        assert_eq!(all.len(), 200);
        for pair in all.windows(2) {
            assert!(pair[0].id() < pair[1].id());
            assert!(pair[0].created_at() <= pair[1].created_at());
        }
    }
}
