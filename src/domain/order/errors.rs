// ============================================================================
// Order Business Rule Errors
// ============================================================================
//
// "Not found" is deliberately absent: lookups and status updates report a
// missing order as `None`.
//

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
