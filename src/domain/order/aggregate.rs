use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{Amount, OrderId, OrderStatus};

// ============================================================================
// Order - immutable purchase record
// ============================================================================
//
// An order is never edited in place. A status change produces a new value
// with the same id, customer, amount and creation time, which then replaces
// the stored one.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    customer_id: String,
    total_amount: Amount,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Build a fresh `PENDING` order stamped with the current time.
    pub fn new(id: OrderId, customer_id: impl Into<String>, total_amount: Amount) -> Self {
        Self::restore(id, customer_id, total_amount, OrderStatus::Pending, Utc::now())
    }

    /// Rebuild an order from already-validated parts, e.g. when a storage
    /// backend loads it back.
    pub fn restore(
        id: OrderId,
        customer_id: impl Into<String>,
        total_amount: Amount,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id: customer_id.into(),
            total_amount,
            status,
            created_at,
        }
    }

    /// Copy of this order carrying `status`; every other field is kept.
    pub fn with_status(&self, status: OrderStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn total_amount(&self) -> Amount {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
