//! CLI interface and argument parsing
//!
//! This module wraps clap's builder API: it turns registered commands into
//! subcommands, handles help and version flags, and dispatches the parsed
//! invocation.

pub mod app;
pub mod help;

// Re-export main types
pub use app::*;
pub use help::*;
