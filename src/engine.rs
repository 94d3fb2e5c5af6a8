use std::sync::Arc;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::clients::{RemoteDirectory, RemoteInventory};
use crate::domain::inventory::OrderLine;
use crate::domain::order::{
    completed_revenue, Amount, Order, OrderError, OrderId, OrderStatistics, OrderStatus,
};
use crate::metrics::Metrics;
use crate::store::OrderStore;

// ============================================================================
// Order Engine
// ============================================================================
//
// Business rules on top of an `OrderStore`:
//   create (validate → allocate id → insert PENDING)
//   query (by id, all, by status, by customer)
//   transition (replace with a copy carrying the new status)
//   aggregate (completed revenue, statistics)
//
// The customer directory and the inventory ledger are read-only oracles,
// consulted only by `preflight`. Creation never waits on them.
//
// ============================================================================

#[derive(Clone)]
struct Oracles {
    directory: Arc<dyn RemoteDirectory>,
    inventory: Arc<dyn RemoteInventory>,
}

/// Advisory outcome of checking a prospective order against the customer
/// directory and the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightReport {
    pub customer_known: bool,
    /// Product ids whose requested quantity is not confirmed available.
    pub unavailable: Vec<String>,
}

impl PreflightReport {
    pub fn is_clear(&self) -> bool {
        self.customer_known && self.unavailable.is_empty()
    }
}

#[derive(Clone)]
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    oracles: Option<Oracles>,
    metrics: Option<Arc<Metrics>>,
}

impl OrderEngine {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            oracles: None,
            metrics: None,
        }
    }

    pub fn with_oracles(
        mut self,
        directory: Arc<dyn RemoteDirectory>,
        inventory: Arc<dyn RemoteInventory>,
    ) -> Self {
        self.oracles = Some(Oracles { directory, inventory });
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Create a `PENDING` order.
    ///
    /// The amount is validated before an id is allocated, so a rejected
    /// request leaves the store untouched.
    pub async fn create_order(
        &self,
        customer_id: impl Into<String>,
        total_amount: Decimal,
    ) -> Result<Order, OrderError> {
        let customer_id = customer_id.into();

        let amount = Amount::new(total_amount).inspect_err(|error| {
            tracing::warn!(customer_id = %customer_id, amount = %total_amount, error = %error, "Rejected order");
            if let Some(metrics) = &self.metrics {
                metrics.order_validation_failures.inc();
            }
        })?;

        let order = self
            .store
            .insert_with(Box::new(move |id| Order::new(id, customer_id, amount)))
            .await;

        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            amount = %order.total_amount(),
            "Order created"
        );
        if let Some(metrics) = &self.metrics {
            metrics.orders_created.inc();
            metrics.orders_stored.set(self.store.len().await as i64);
        }

        Ok(order)
    }

    pub async fn find_by_id(&self, id: OrderId) -> Option<Order> {
        let order = self.store.get(id).await;
        if order.is_none() {
            tracing::debug!(order_id = %id, "Order not found");
        }
        order
    }

    /// Every order, most recent first. Orders created at the same instant
    /// keep insertion order.
    pub async fn list_all(&self) -> Vec<Order> {
        newest_first(self.store.all().await)
    }

    /// Orders in `status`, in insertion order.
    pub async fn list_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.store
            .all()
            .await
            .into_iter()
            .filter(|order| order.status() == status)
            .collect()
    }

    /// Orders of one customer, most recent first.
    pub async fn list_by_customer(&self, customer_id: &str) -> Vec<Order> {
        newest_first(
            self.store
                .all()
                .await
                .into_iter()
                .filter(|order| order.customer_id() == customer_id)
                .collect(),
        )
    }

    pub async fn list_by_customer_and_status(
        &self,
        customer_id: &str,
        status: OrderStatus,
    ) -> Vec<Order> {
        newest_first(
            self.store
                .all()
                .await
                .into_iter()
                .filter(|order| order.customer_id() == customer_id && order.status() == status)
                .collect(),
        )
    }

    /// Replace the order with a copy carrying `status`. Any status may move
    /// to any other. `None` when the id is unknown.
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Option<Order> {
        let Some(existing) = self.store.get(id).await else {
            tracing::debug!(order_id = %id, status = %status, "Status update for unknown order");
            return None;
        };

        let updated = existing.with_status(status);
        self.store.put(updated.clone()).await;

        tracing::info!(
            order_id = %id,
            from = %existing.status(),
            to = %status,
            "Order status updated"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_status_transition(existing.status().as_str(), status.as_str());
        }

        Some(updated)
    }

    /// Sum of totals over `COMPLETED` orders, exact decimal arithmetic.
    pub async fn calculate_total_revenue(&self) -> Decimal {
        completed_revenue(&self.store.all().await)
    }

    pub async fn statistics(&self) -> OrderStatistics {
        OrderStatistics::from_orders(&self.store.all().await)
    }

    /// Ask the oracles whether `customer_id` exists and every line is in
    /// stock. Purely advisory: nothing is reserved and the store is not
    /// touched. Without oracles every answer is negative.
    pub async fn preflight(&self, customer_id: &str, lines: &[OrderLine]) -> PreflightReport {
        let Some(oracles) = &self.oracles else {
            tracing::warn!(customer_id, "No oracles configured, preflight fails closed");
            return PreflightReport {
                customer_known: false,
                unavailable: lines.iter().map(|line| line.product_id.clone()).collect(),
            };
        };

        let customer_check = oracles.directory.exists(customer_id);
        let stock_checks = join_all(lines.iter().map(|line| async move {
            let available = oracles
                .inventory
                .is_available(&line.product_id, line.quantity)
                .await;
            (line, available)
        }));
        let (customer_known, stock) = tokio::join!(customer_check, stock_checks);

        let unavailable: Vec<String> = stock
            .into_iter()
            .filter(|(_, available)| !available)
            .map(|(line, _)| line.product_id.clone())
            .collect();

        if !customer_known {
            tracing::warn!(customer_id, "Preflight: customer not confirmed by directory");
        }
        for product_id in &unavailable {
            tracing::warn!(customer_id, product_id = %product_id, "Preflight: product not confirmed available");
        }

        PreflightReport {
            customer_known,
            unavailable,
        }
    }
}

/// Stable sort by `created_at` descending.
fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    orders
}
