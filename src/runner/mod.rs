//! Command dispatch machinery
//!
//! This module turns a command's main locator into a handler and manages
//! the context handed to it.

pub mod context;
pub mod locator;
pub mod modules;

// Re-export main types
pub use context::*;
pub use locator::*;
pub use modules::*;
