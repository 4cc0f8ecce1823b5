//! Configuration parsing and validation
//!
//! A `Cli` can be described in YAML: program metadata plus the plugin
//! entry points its commands are loaded from.

pub mod parse;
pub mod types;

// Re-export main types
pub use parse::*;
pub use types::*;
