//! Option-setup functions
//!
//! A setup function receives the `clap::Command` created for its subcommand
//! and returns it with the command's own arguments attached.

use clap::Command;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Signature of an option-setup function
pub type SetupFnPtr = fn(Command) -> Command;

/// A named option-setup function together with its documentation text
///
/// Every [`SetupFn::new`] makes a distinct function; clones, including ones
/// tagged later with [`SetupFn::in_module`], stay the same function.
#[derive(Clone)]
pub struct SetupFn {
    id: usize,
    name: &'static str,
    doc: &'static str,
    module: Option<String>,
    func: SetupFnPtr,
}

impl SetupFn {
    /// Create a setup function from its identifier, doc text and body
    pub fn new(name: &'static str, doc: &'static str, func: SetupFnPtr) -> Self {
        SetupFn {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name,
            doc,
            module: None,
            func,
        }
    }

    /// Tag the function with the dotted name of the module declaring it
    ///
    /// Relative locators are expanded against this module's package.
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Declared identifier (`foo_bar`)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw documentation text
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Declaring module, if known
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Apply the function to a subcommand
    pub fn call(&self, command: Command) -> Command {
        (self.func)(command)
    }
}

impl PartialEq for SetupFn {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SetupFn {}

impl fmt::Debug for SetupFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupFn")
            .field("name", &self.name)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// Define a [`SetupFn`] inline, capturing its `///` comments as help text
///
/// ```
/// use subcli::setup_fn;
///
/// let setup = setup_fn! {
///     /// Say hello
///     ///
///     /// Prints a greeting for the given name.
///     fn greet(cmd) {
///         cmd.arg(subcli::clap::Arg::new("name").long("name"))
///     }
/// };
/// assert_eq!(setup.name(), "greet");
/// ```
#[macro_export]
macro_rules! setup_fn {
    ($(#[doc = $doc:literal])* fn $name:ident($cmd:ident) $body:block) => {
        $crate::registry::SetupFn::new(stringify!($name), concat!($($doc, "\n"),*), {
            fn $name($cmd: $crate::clap::Command) -> $crate::clap::Command $body
            $name
        })
    };
}
