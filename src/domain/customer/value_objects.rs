use serde::{Deserialize, Serialize};

// ============================================================================
// Customer Value Objects
// ============================================================================
//
// Read-only projection of a record owned by the customer service. The
// orchestrator never writes customers; it only asks whether one exists.
//
// ============================================================================

/// Customer email address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(pub String);

impl Email {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Customer phone number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(pub String);

impl PhoneNumber {
    pub fn new(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Customer as returned by `GET /api/customers/{customerId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Storage key inside the customer service; unused by the orchestrator.
    #[serde(default)]
    pub id: Option<i64>,
    pub customer_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_deserialization() {
        let json = r#"{
            "id": 7,
            "customerId": "CUST001",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+44 20 7946 0000"
        }"#;

        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.customer_id, "CUST001");
        assert_eq!(customer.email.as_ref().map(Email::as_str), Some("ada@example.com"));
        assert_eq!(customer.phone.as_ref().map(PhoneNumber::as_str), Some("+44 20 7946 0000"));
    }

    #[test]
    fn test_customer_tolerates_missing_optional_fields() {
        let customer: Customer = serde_json::from_str(r#"{"customerId":"CUST002"}"#).unwrap();
        assert_eq!(customer.customer_id, "CUST002");
        assert!(customer.id.is_none());
        assert!(customer.email.is_none());
    }
}
