use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::aggregate::Order;

// ============================================================================
// Order Statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_orders: usize,
    pub completed_orders: usize,
    pub average_order_value: Decimal,
}

impl OrderStatistics {
    /// Summarise a snapshot of orders.
    ///
    /// The average is the sum of every order total divided by the order
    /// count, rounded half-up to two places. The divisor is floored at 1 so
    /// an empty snapshot averages to `0.00`.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut total_orders = 0usize;
        let mut completed_orders = 0usize;
        let mut amounts = Vec::new();

        for order in orders {
            total_orders += 1;
            if order.is_completed() {
                completed_orders += 1;
            }
            amounts.push(order.total_amount().value());
        }

        let sum = saturating_total(amounts, "average order value");

        let divisor = Decimal::from(total_orders.max(1));
        let mut average_order_value = (sum / divisor)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        average_order_value.rescale(2);

        Self {
            total_orders,
            completed_orders,
            average_order_value,
        }
    }
}

/// Sum of totals over completed orders only.
pub fn completed_revenue<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Decimal {
    saturating_total(
        orders
            .into_iter()
            .filter(|order| order.is_completed())
            .map(|order| order.total_amount().value()),
        "revenue",
    )
}

/// Sum that stops at `Decimal::MAX` instead of panicking on overflow.
fn saturating_total(amounts: impl IntoIterator<Item = Decimal>, what: &str) -> Decimal {
    let mut total = Decimal::ZERO;
    for amount in amounts {
        match total.checked_add(amount) {
            Some(next) => total = next,
            None => {
                tracing::warn!(what, "Order totals overflow, reporting Decimal::MAX");
                return Decimal::MAX;
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, OrderId, OrderStatus};
    use rust_decimal_macros::dec;

    fn order(id: u64, amount: Decimal, status: OrderStatus) -> Order {
        Order::new(OrderId(id), "CUST001", Amount::new(amount).unwrap()).with_status(status)
    }

    #[test]
    fn test_empty_statistics() {
        let stats = OrderStatistics::from_orders(&Vec::<Order>::new());

        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.completed_orders, 0);
        assert_eq!(stats.average_order_value, dec!(0.00));
        assert_eq!(stats.average_order_value.to_string(), "0.00");
    }

    #[test]
    fn test_average_rounds_half_up() {
        let orders = vec![
            order(1, dec!(0.01), OrderStatus::Pending),
            order(2, dec!(0.00), OrderStatus::Pending),
        ];

        // 0.005 rounds up, not to even
        let stats = OrderStatistics::from_orders(&orders);
        assert_eq!(stats.average_order_value.to_string(), "0.01");
    }

    #[test]
    fn test_average_counts_every_status() {
        let orders = vec![
            order(1, dec!(100.00), OrderStatus::Completed),
            order(2, dec!(50.00), OrderStatus::Cancelled),
            order(3, dec!(10.00), OrderStatus::Pending),
        ];

        let stats = OrderStatistics::from_orders(&orders);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.average_order_value.to_string(), "53.33");
    }

    #[test]
    fn test_completed_revenue_ignores_other_statuses() {
        let orders = vec![
            order(1, dec!(100.00), OrderStatus::Completed),
            order(2, dec!(200.00), OrderStatus::Completed),
            order(3, dec!(999.99), OrderStatus::Refunded),
            order(4, dec!(5.00), OrderStatus::Pending),
            order(5, dec!(7.00), OrderStatus::Cancelled),
        ];

        assert_eq!(completed_revenue(&orders), dec!(300.00));
        assert_eq!(completed_revenue(&Vec::<Order>::new()), Decimal::ZERO);
    }

    #[test]
    fn test_largest_amounts_sum_exactly() {
        let orders = vec![
            order(1, Amount::MAX.value(), OrderStatus::Completed),
            order(2, Amount::MAX.value(), OrderStatus::Completed),
        ];

        assert_eq!(completed_revenue(&orders), dec!(1999999999999.98));
        let stats = OrderStatistics::from_orders(&orders);
        assert_eq!(stats.average_order_value.to_string(), "999999999999.99");
    }

    #[test]
    fn test_saturating_total_stops_at_max() {
        let total = saturating_total([Decimal::MAX, Decimal::MAX, dec!(1)], "revenue");
        assert_eq!(total, Decimal::MAX);
        assert_eq!(saturating_total([dec!(1.50), dec!(2.25)], "revenue"), dec!(3.75));
    }

    #[test]
    fn test_statistics_serialization() {
        let orders = vec![
            order(1, dec!(100.00), OrderStatus::Completed),
            order(2, dec!(200.00), OrderStatus::Completed),
        ];
        let json = serde_json::to_value(OrderStatistics::from_orders(&orders)).unwrap();

        assert_eq!(json["totalOrders"], 2);
        assert_eq!(json["completedOrders"], 2);
        assert_eq!(json["averageOrderValue"], "150.00");
    }
}
