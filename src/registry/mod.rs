//! Command registration
//!
//! Setup functions and the lazy registry that buffers their registrations
//! until a consumer is ready.

pub mod lazy;
pub mod setup;

// Re-export main types
pub use lazy::*;
pub use setup::*;
