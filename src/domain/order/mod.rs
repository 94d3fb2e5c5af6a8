// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (OrderId, OrderStatus, Amount)
// - Errors (OrderError)
// - Order record (immutable, replaced wholesale on status change)
// - Statistics and revenue over a snapshot of orders
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;
pub mod statistics;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
pub use statistics::*;
