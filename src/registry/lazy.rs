//! Deferred command registration
//!
//! Registrations are usually made while a module is being set up, long
//! before the `Cli` that will own the commands exists. The registry buffers
//! them and replays each one onto a consumer once a source containing the
//! setup function is loaded.

use crate::registry::SetupFn;
use crate::runner::{ContextKwargs, Locator};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Arguments captured when a setup function is registered
pub struct CommandArgs<C> {
    /// Where the command's handler lives
    pub main: Locator<C>,
    /// Explicit command name, overriding the derived one
    pub name: Option<String>,
    /// Extra keyword arguments handed to the context factory
    pub context_kwargs: ContextKwargs,
}

impl<C> CommandArgs<C> {
    /// Arguments with just a main locator
    pub fn new(main: impl Into<Locator<C>>) -> Self {
        CommandArgs {
            main: main.into(),
            name: None,
            context_kwargs: ContextKwargs::new(),
        }
    }

    /// Register under an explicit name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a context keyword argument
    pub fn context_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_kwargs.insert(key.into(), value.into());
        self
    }
}

impl<C> Clone for CommandArgs<C> {
    fn clone(&self) -> Self {
        CommandArgs {
            main: self.main.clone(),
            name: self.name.clone(),
            context_kwargs: self.context_kwargs.clone(),
        }
    }
}

impl<C> From<&str> for CommandArgs<C> {
    fn from(main: &str) -> Self {
        CommandArgs::new(main)
    }
}

impl<C> From<Locator<C>> for CommandArgs<C> {
    fn from(main: Locator<C>) -> Self {
        CommandArgs::new(main)
    }
}

/// A registration captured before any consumer existed
pub struct PendingRegistration<C> {
    pub setup: SetupFn,
    pub args: CommandArgs<C>,
}

impl<C> Clone for PendingRegistration<C> {
    fn clone(&self) -> Self {
        PendingRegistration {
            setup: self.setup.clone(),
            args: self.args.clone(),
        }
    }
}

/// Something that can be searched for registered setup functions
///
/// A function is discovered when it was registered through a
/// [`LazyRegistry`] and the source contains it.
pub trait CommandSource {
    fn contains(&self, setup: &SetupFn) -> bool;
}

impl CommandSource for [SetupFn] {
    fn contains(&self, setup: &SetupFn) -> bool {
        self.iter().any(|s| s == setup)
    }
}

impl<const N: usize> CommandSource for [SetupFn; N] {
    fn contains(&self, setup: &SetupFn) -> bool {
        self.as_slice().contains(setup)
    }
}

impl CommandSource for Vec<SetupFn> {
    fn contains(&self, setup: &SetupFn) -> bool {
        self.as_slice().contains(setup)
    }
}

impl<K> CommandSource for HashMap<K, SetupFn> {
    fn contains(&self, setup: &SetupFn) -> bool {
        self.values().any(|s| s == setup)
    }
}

impl<K> CommandSource for BTreeMap<K, SetupFn> {
    fn contains(&self, setup: &SetupFn) -> bool {
        self.values().any(|s| s == setup)
    }
}

/// Ordered buffer of pending registrations
pub struct LazyRegistry<C> {
    pending: RefCell<Vec<PendingRegistration<C>>>,
}

/// Returned by [`LazyRegistry::decorate`]; records a setup function when applied
pub struct Decorator<'r, C> {
    registry: &'r LazyRegistry<C>,
    args: CommandArgs<C>,
}

impl<C> Decorator<'_, C> {
    /// Record `setup` with the captured arguments and hand it back unchanged
    pub fn apply(self, setup: SetupFn) -> SetupFn {
        debug!(function = setup.name(), module = ?setup.module(), "recording command registration");
        self.registry.pending.borrow_mut().push(PendingRegistration {
            setup: setup.clone(),
            args: self.args,
        });
        setup
    }
}

impl<C> LazyRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        LazyRegistry {
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Capture registration arguments for a later [`Decorator::apply`]
    pub fn decorate(&self, args: CommandArgs<C>) -> Decorator<'_, C> {
        Decorator {
            registry: self,
            args,
        }
    }

    /// Replay every registration whose setup function is in `source`
    ///
    /// `consumer` is called in registration order with exactly the
    /// arguments captured at registration time.
    pub fn discover_and_call<S, F>(&self, source: &S, mut consumer: F)
    where
        S: CommandSource + ?Sized,
        F: FnMut(SetupFn, CommandArgs<C>),
    {
        // Clone out first so the consumer may register into this registry.
        let found: Vec<PendingRegistration<C>> = self
            .pending
            .borrow()
            .iter()
            .filter(|p| source.contains(&p.setup))
            .cloned()
            .collect();

        debug!(count = found.len(), "discovered pending registrations");
        for pending in found {
            consumer(pending.setup, pending.args);
        }
    }

    /// Remove and return every pending registration
    pub fn drain(&self) -> Vec<PendingRegistration<C>> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl<C> Default for LazyRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
