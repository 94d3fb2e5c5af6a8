use serde::{Deserialize, Serialize};

// ============================================================================
// Inventory Domain (read-only projection)
// ============================================================================
//
// The inventory service owns stock levels. The orchestrator only asks
// whether a quantity is available; it never reserves or decrements.
//
// ============================================================================

/// Stock record as kept by the inventory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_id: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub reserved_quantity: u32,
}

impl InventoryItem {
    pub fn available_quantity(&self) -> u32 {
        self.quantity.saturating_sub(self.reserved_quantity)
    }

    pub fn is_available(&self, requested: u32) -> bool {
        self.available_quantity() >= requested
    }
}

/// Body of `GET /api/inventory/{productId}/available?quantity=N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub product_id: String,
    pub requested_quantity: u32,
    pub available: bool,
}

/// A product and quantity a caller intends to order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_quantity_subtracts_reserved() {
        let item = InventoryItem {
            product_id: "P1".to_string(),
            product_name: Some("Widget".to_string()),
            quantity: 10,
            reserved_quantity: 4,
        };

        assert_eq!(item.available_quantity(), 6);
        assert!(item.is_available(6));
        assert!(!item.is_available(7));
    }

    #[test]
    fn test_over_reserved_item_has_nothing_available() {
        let item = InventoryItem {
            product_id: "P2".to_string(),
            product_name: None,
            quantity: 2,
            reserved_quantity: 5,
        };

        assert_eq!(item.available_quantity(), 0);
        assert!(item.is_available(0));
        assert!(!item.is_available(1));
    }

    #[test]
    fn test_availability_wire_format() {
        let json = r#"{"productId":"P1","requestedQuantity":5,"available":true}"#;
        let availability: Availability = serde_json::from_str(json).unwrap();

        assert_eq!(availability.product_id, "P1");
        assert_eq!(availability.requested_quantity, 5);
        assert!(availability.available);
    }
}
