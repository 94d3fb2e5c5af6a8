// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// `order` is owned by this service. `customer` and `inventory` are read-only
// projections of records owned by the downstream services.
//
// ============================================================================

pub mod order;
pub mod customer;
pub mod inventory;
