//! Module table
//!
//! Commands refer to their handlers by dotted module path. The table maps
//! those paths to modules whose contents are produced by an init callback
//! the first time the module is imported. Registrations made inside an init
//! land in the table's [`LazyRegistry`].

use crate::error::{ResolveError, ResolveResult};
use crate::registry::{CommandArgs, CommandSource, LazyRegistry, SetupFn};
use crate::runner::{Handler, HandlerResult, Locator};
use clap::ArgMatches;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Callback filling in a module's contents on first import
pub type ModuleInit<C> = Box<dyn Fn(&mut ModuleBuilder<'_, C>)>;

/// A loaded module: named handler functions plus the setup functions it declares
pub struct Module<C> {
    name: String,
    package: bool,
    functions: HashMap<String, Handler<C>>,
    setups: Vec<SetupFn>,
}

impl<C> Module<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_package(&self) -> bool {
        self.package
    }

    /// Look up a handler attribute
    pub fn function(&self, name: &str) -> Option<&Handler<C>> {
        self.functions.get(name)
    }

    /// Setup functions declared by this module, in declaration order
    pub fn setups(&self) -> &[SetupFn] {
        &self.setups
    }
}

impl<C> CommandSource for Module<C> {
    fn contains(&self, setup: &SetupFn) -> bool {
        self.setups.contains(setup)
    }
}

/// Handed to a module's init callback
pub struct ModuleBuilder<'r, C> {
    name: String,
    package: bool,
    registry: &'r LazyRegistry<C>,
    functions: HashMap<String, Handler<C>>,
    setups: Vec<SetupFn>,
}

impl<C> ModuleBuilder<'_, C> {
    /// Dotted name of the module being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expose a handler under `name`
    pub fn function<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut C, &ArgMatches) -> HandlerResult + 'static,
    {
        self.functions.insert(name.to_string(), Rc::new(handler));
        self
    }

    /// Declare a setup function and register it as a command
    pub fn command(&mut self, setup: SetupFn, args: CommandArgs<C>) -> &mut Self {
        let setup = self.registry.decorate(args).apply(setup.in_module(self.name.clone()));
        self.push_setup(setup);
        self
    }

    /// Declare a setup function without registering it
    pub fn setup(&mut self, setup: SetupFn) -> &mut Self {
        let setup = setup.in_module(self.name.clone());
        self.push_setup(setup);
        self
    }

    fn push_setup(&mut self, setup: SetupFn) {
        if !self.setups.contains(&setup) {
            self.setups.push(setup);
        }
    }

    fn finish(self) -> Module<C> {
        Module {
            name: self.name,
            package: self.package,
            functions: self.functions,
            setups: self.setups,
        }
    }
}

struct ModuleEntry<C> {
    package: bool,
    init: ModuleInit<C>,
    loaded: Option<Module<C>>,
}

/// The set of importable modules and the registry their inits write to
pub struct Modules<C> {
    registry: Rc<LazyRegistry<C>>,
    entries: HashMap<String, ModuleEntry<C>>,
}

impl<C> Modules<C> {
    /// Create an empty table with its own registry
    pub fn new() -> Self {
        Self::with_registry(Rc::new(LazyRegistry::new()))
    }

    /// Create an empty table whose inits register into `registry`
    pub fn with_registry(registry: Rc<LazyRegistry<C>>) -> Self {
        Modules {
            registry,
            entries: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Rc<LazyRegistry<C>> {
        &self.registry
    }

    /// Define a plain module
    pub fn define<F>(&mut self, name: &str, init: F) -> &mut Self
    where
        F: Fn(&mut ModuleBuilder<'_, C>) + 'static,
    {
        self.insert(name, false, Box::new(init))
    }

    /// Define a package module (the equivalent of a package's `__init__`)
    pub fn define_package<F>(&mut self, name: &str, init: F) -> &mut Self
    where
        F: Fn(&mut ModuleBuilder<'_, C>) + 'static,
    {
        self.insert(name, true, Box::new(init))
    }

    fn insert(&mut self, name: &str, package: bool, init: ModuleInit<C>) -> &mut Self {
        self.entries.insert(
            name.to_string(),
            ModuleEntry {
                package,
                init,
                loaded: None,
            },
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` is a defined module that has already been imported
    pub fn is_loaded(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.loaded.is_some())
    }

    /// Import a module, running its init on first use
    pub fn import(&mut self, name: &str) -> ResolveResult<&Module<C>> {
        let registry = Rc::clone(&self.registry);
        let ModuleEntry {
            package,
            init,
            loaded,
        } = self
            .entries
            .get_mut(name)
            .ok_or_else(|| ResolveError::ModuleNotFound(name.to_string()))?;

        Ok(loaded.get_or_insert_with(|| {
            debug!(module = name, "importing module");
            let mut builder = ModuleBuilder {
                name: name.to_string(),
                package: *package,
                registry: registry.as_ref(),
                functions: HashMap::new(),
                setups: Vec::new(),
            };
            init(&mut builder);
            builder.finish()
        }))
    }

    /// Enclosing package of a module
    ///
    /// A package is its own enclosing package; any other module belongs to
    /// the package named by dropping its last dotted component.
    pub fn package_of(&self, module: &str) -> String {
        if self.entries.get(module).is_some_and(|e| e.package) {
            return module.to_string();
        }
        match module.rsplit_once('.') {
            Some((package, _)) => package.to_string(),
            None => module.to_string(),
        }
    }

    /// Turn a locator into a handler
    ///
    /// `package` is the enclosing package of the module that declared the
    /// command; relative locators fail without one.
    pub fn resolve(&mut self, locator: &Locator<C>, package: Option<&str>) -> ResolveResult<Handler<C>> {
        if let Locator::Direct(handler) = locator {
            return Ok(Rc::clone(handler));
        }
        let Some((module, function)) = locator.target(package)? else {
            return Err(ResolveError::NoDeclaringModule(locator.to_string()));
        };

        debug!(module = %module, function = %function, "resolving handler");
        self.import(&module)?
            .function(&function)
            .cloned()
            .ok_or(ResolveError::FunctionNotFound { module, function })
    }
}

impl<C> Default for Modules<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute module name for a possibly relative `name`
///
/// Each leading dot after the first climbs one package level, as with
/// relative imports: `.x` in `a.b` is `a.b.x`, `..x` is `a.x`.
pub fn resolve_module_name(name: &str, package: &str) -> ResolveResult<String> {
    let rest = name.trim_start_matches('.');
    let level = name.len() - rest.len();
    if level == 0 {
        return Ok(name.to_string());
    }

    let mut base = package;
    for _ in 1..level {
        base = match base.rsplit_once('.') {
            Some((parent, _)) => parent,
            None => {
                return Err(ResolveError::BeyondTopLevel {
                    name: name.to_string(),
                    package: package.to_string(),
                })
            }
        };
    }

    if rest.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{}.{}", base, rest))
    }
}
