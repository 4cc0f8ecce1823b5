//! subcli - extensible subcommands on top of clap
//!
//! Commands are registered as setup functions that add their own options to
//! a clap subcommand, together with a locator naming the handler to run.
//! Registrations can be made before the [`Cli`] exists: a [`LazyRegistry`]
//! buffers them until a module, a set of functions or a plugin entry point
//! group is loaded into the app. Handlers are looked up only when their
//! command is dispatched.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod runner;

// Re-export commonly used types
pub use cli::{Cli, CommandRecord};
pub use config::{CliConfig, EntryPoints};
pub use error::{CliError, ConfigError, ResolveError, Result};
pub use registry::{CommandArgs, CommandSource, LazyRegistry, SetupFn};
pub use runner::{ContextKwargs, Handler, HandlerResult, Locator, Modules, Scope};

/// Re-exported for setup functions and the [`setup_fn!`] macro
pub use clap;

/// Current version of subcli
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
