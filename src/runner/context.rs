//! Execution context scopes
//!
//! Every dispatch builds one context through a [`ContextFactory`]. The
//! factory hands back a [`Scope`] that owns the context and, optionally, a
//! teardown that runs once the handler is done, whether it returned, failed
//! or panicked.

use clap::ArgMatches;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Keyword arguments a command passes on to the context factory
pub type ContextKwargs = BTreeMap<String, String>;

type Teardown<C> = Box<dyn FnOnce(&mut C)>;

/// A context together with its teardown
pub struct Scope<C> {
    context: C,
    teardown: Option<Teardown<C>>,
}

impl<C> Scope<C> {
    /// Scope with nothing to tear down
    pub fn new(context: C) -> Self {
        Scope {
            context,
            teardown: None,
        }
    }

    /// Scope that runs `teardown` when dropped
    pub fn with_teardown<F>(context: C, teardown: F) -> Self
    where
        F: FnOnce(&mut C) + 'static,
    {
        Scope {
            context,
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }
}

impl<C> Deref for Scope<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.context
    }
}

impl<C> DerefMut for Scope<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.context
    }
}

impl<C> Drop for Scope<C> {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown(&mut self.context);
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for Scope<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("context", &self.context)
            .field("teardown", &self.teardown.is_some())
            .finish()
    }
}

/// Builds the context for one dispatch
///
/// Implemented for every `Fn(&ArgMatches, &ContextKwargs) -> anyhow::Result<Scope<C>>`.
pub trait ContextFactory<C> {
    fn acquire(&self, args: &ArgMatches, kwargs: &ContextKwargs) -> anyhow::Result<Scope<C>>;
}

impl<C, F> ContextFactory<C> for F
where
    F: Fn(&ArgMatches, &ContextKwargs) -> anyhow::Result<Scope<C>>,
{
    fn acquire(&self, args: &ArgMatches, kwargs: &ContextKwargs) -> anyhow::Result<Scope<C>> {
        self(args, kwargs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::panic;
    use std::rc::Rc;

    #[test]
    fn test_scope_without_teardown() {
        let mut scope = Scope::new(vec![1]);
        scope.push(2);
        assert_eq!(scope.context(), &vec![1, 2]);
    }

    #[test]
    fn test_teardown_runs_on_drop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&log);
        {
            let mut scope = Scope::with_teardown(0, move |ctx: &mut i32| seen.borrow_mut().push(*ctx));
            *scope.context_mut() = 7;
            log.borrow_mut().push(1);
        }
        assert_eq!(*log.borrow(), vec![1, 7]);
    }

    #[test]
    fn test_teardown_runs_on_panic() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&log);
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _scope = Scope::with_teardown((), move |_| seen.borrow_mut().push("teardown"));
            panic!("handler blew up");
        }));
        assert!(result.is_err());
        assert_eq!(*log.borrow(), vec!["teardown"]);
    }

    #[test]
    fn test_closure_is_a_factory() {
        let factory = |_: &ArgMatches, kwargs: &ContextKwargs| {
            Ok::<_, anyhow::Error>(Scope::new(kwargs.get("db").cloned().unwrap_or_default()))
        };
        let matches = clap::Command::new("t").get_matches_from(vec!["t"]);
        let mut kwargs = ContextKwargs::new();
        kwargs.insert("db".to_string(), "memory".to_string());

        let scope = factory.acquire(&matches, &kwargs).unwrap();
        assert_eq!(scope.as_str(), "memory");
    }
}
