//! Error types for subcli

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for subcli operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Main error type for subcli
///
/// Argument-parse errors never show up here: they are rendered as usage
/// text and turned into exit status 2 by [`crate::cli::Cli::run`].
#[derive(Error, Debug)]
pub enum CliError {
    /// A command's main locator could not be turned into a handler
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors while writing help, usage or version text
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors raised by a handler or by the context factory
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// Errors turning a locator or module path into something callable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No module named '{0}'")]
    ModuleNotFound(String),

    #[error("Module '{module}' has no function '{function}'")]
    FunctionNotFound { module: String, function: String },

    #[error("Relative locator '{0}' has no declaring module")]
    NoDeclaringModule(String),

    #[error("Relative module name '{name}' goes beyond top-level package '{package}'")]
    BeyondTopLevel { name: String, package: String },
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Specialized result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
