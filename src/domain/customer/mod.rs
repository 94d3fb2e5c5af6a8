// ============================================================================
// Customer Domain (read-only projection)
// ============================================================================

pub mod value_objects;

pub use value_objects::*;
