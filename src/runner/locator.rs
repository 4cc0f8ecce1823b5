//! Main locators
//!
//! A locator says where a command's handler lives. It is only turned into a
//! handler when the command is dispatched, so modules backing commands that
//! are never invoked are never loaded.

use crate::error::{ResolveError, ResolveResult};
use clap::ArgMatches;
use std::fmt;
use std::rc::Rc;

/// Function name used when a locator does not name one
pub const DEFAULT_FUNCTION: &str = "main";

/// What a handler returns: `None` is success, `Some(n)` an exit status
pub type HandlerResult = anyhow::Result<Option<i32>>;

/// A command entry point, called with the shared context and parsed arguments
pub type Handler<C> = Rc<dyn Fn(&mut C, &ArgMatches) -> HandlerResult>;

/// Reference to a command's handler
pub enum Locator<C> {
    /// A handler used as-is
    Direct(Handler<C>),

    /// `module` or `module:function`
    Absolute { module: String, function: String },

    /// `.suffix[:function]` or `:function`, expanded against the package of
    /// the module declaring the command
    Relative { suffix: String, function: String },
}

impl<C> Locator<C> {
    /// Wrap a closure or function as a direct locator
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(&mut C, &ArgMatches) -> HandlerResult + 'static,
    {
        Locator::Direct(Rc::new(handler))
    }

    /// Parse a textual locator
    pub fn parse(locator: &str) -> Self {
        let (path, function) = match locator.split_once(':') {
            Some((path, "")) => (path, DEFAULT_FUNCTION),
            Some((path, function)) => (path, function),
            None => (locator, DEFAULT_FUNCTION),
        };

        if locator.starts_with('.') || locator.starts_with(':') {
            // A lone "." or ":" means the package itself.
            let suffix = if path == "." { "" } else { path };
            Locator::Relative {
                suffix: suffix.to_string(),
                function: function.to_string(),
            }
        } else {
            Locator::Absolute {
                module: path.to_string(),
                function: function.to_string(),
            }
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Locator::Relative { .. })
    }

    /// Absolute `(module, function)` pair this locator names
    ///
    /// `package` is the enclosing package of the declaring module; it is
    /// only consulted for relative locators. Returns `None` for direct
    /// handlers.
    pub fn target(&self, package: Option<&str>) -> ResolveResult<Option<(String, String)>> {
        match self {
            Locator::Direct(_) => Ok(None),
            Locator::Absolute { module, function } => Ok(Some((module.clone(), function.clone()))),
            Locator::Relative { suffix, function } => {
                let package =
                    package.ok_or_else(|| ResolveError::NoDeclaringModule(self.to_string()))?;
                Ok(Some((format!("{}{}", package, suffix), function.clone())))
            }
        }
    }
}

impl<C> Clone for Locator<C> {
    fn clone(&self) -> Self {
        match self {
            Locator::Direct(handler) => Locator::Direct(Rc::clone(handler)),
            Locator::Absolute { module, function } => Locator::Absolute {
                module: module.clone(),
                function: function.clone(),
            },
            Locator::Relative { suffix, function } => Locator::Relative {
                suffix: suffix.clone(),
                function: function.clone(),
            },
        }
    }
}

impl<C> fmt::Display for Locator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Direct(_) => write!(f, "<handler>"),
            Locator::Absolute { module, function } => write!(f, "{}:{}", module, function),
            Locator::Relative { suffix, function } if suffix.is_empty() => {
                write!(f, ":{}", function)
            }
            Locator::Relative { suffix, function } => write!(f, "{}:{}", suffix, function),
        }
    }
}

impl<C> fmt::Debug for Locator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self)
    }
}

impl<C> From<&str> for Locator<C> {
    fn from(locator: &str) -> Self {
        Locator::parse(locator)
    }
}

impl<C> From<String> for Locator<C> {
    fn from(locator: String) -> Self {
        Locator::parse(&locator)
    }
}

impl<C> From<Handler<C>> for Locator<C> {
    fn from(handler: Handler<C>) -> Self {
        Locator::Direct(handler)
    }
}
