//! Main CLI application

use crate::cli::help::parse_docstring;
use crate::config::{CliConfig, EntryPoints};
use crate::error::{CliError, Result};
use crate::registry::{CommandArgs, CommandSource, LazyRegistry, SetupFn};
use crate::runner::{
    resolve_module_name, ContextFactory, ContextKwargs, Handler, Locator, Modules, Scope,
};
use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Exit status for a successful run
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status for argument errors
pub const EXIT_USAGE: i32 = 2;

/// Arg id of the version flag
const VERSION_ARG: &str = "version";

/// Program name when neither `prog` nor `argv[0]` gives one
const DEFAULT_PROG: &str = "prog";

type GenericOptions = Box<dyn Fn(Command) -> Command>;

/// The resolved registration of one subcommand
pub struct CommandRecord<C> {
    setup: SetupFn,
    main: Locator<C>,
    name: String,
    help: String,
    description: Option<String>,
    context_kwargs: ContextKwargs,
    package: Option<String>,
}

impl<C> CommandRecord<C> {
    pub fn setup(&self) -> &SetupFn {
        &self.setup
    }

    pub fn main(&self) -> &Locator<C> {
        &self.main
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line summary shown in the command list
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Long help: the summary followed by the long description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn context_kwargs(&self) -> &ContextKwargs {
        &self.context_kwargs
    }

    /// Package relative locators are expanded against
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    fn subcommand(&self) -> Command {
        let mut cmd = Command::new(self.name.clone()).about(self.help.clone());
        if let Some(description) = &self.description {
            cmd = cmd.long_about(description.clone());
        }
        self.setup.call(cmd)
    }
}

/// CLI application with subcommands
pub struct Cli<C> {
    prog: Option<String>,
    usage: Option<String>,
    description: Option<String>,
    version: Option<String>,
    add_help_command: bool,
    generic_options: Vec<GenericOptions>,
    commands: BTreeMap<String, CommandRecord<C>>,
    context_factory: Box<dyn ContextFactory<C>>,
    modules: Modules<C>,
    entry_points: EntryPoints,
}

impl<C: Default + 'static> Cli<C> {
    /// Create an app whose handlers get `C::default()` as context
    pub fn new() -> Self {
        Self::with_context(|_, _| Ok(C::default()))
    }
}

impl<C: Default + 'static> Default for Cli<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Cli<C> {
    /// Create an app that builds its context with `factory`
    pub fn with_context<F>(factory: F) -> Self
    where
        F: Fn(&ArgMatches, &ContextKwargs) -> anyhow::Result<C> + 'static,
    {
        Self::with_scoped_context(move |args: &ArgMatches, kwargs: &ContextKwargs| {
            factory(args, kwargs).map(Scope::new)
        })
    }

    /// Create an app whose context comes with a teardown
    pub fn with_scoped_context<F>(factory: F) -> Self
    where
        F: ContextFactory<C> + 'static,
    {
        Cli {
            prog: None,
            usage: None,
            description: None,
            version: None,
            add_help_command: true,
            generic_options: Vec::new(),
            commands: BTreeMap::new(),
            context_factory: Box::new(factory),
            modules: Modules::new(),
            entry_points: EntryPoints::new(),
        }
    }
}

impl<C> Cli<C> {
    /// Set the program name used in usage text
    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = Some(prog.into());
        self
    }

    /// Replace the generated usage line
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add `-V/--version`, printing `version` verbatim
    pub fn version(mut self, version: impl Into<String>) -> Self {
        if self.version.is_none() {
            self.add_generic_option(
                Arg::new(VERSION_ARG)
                    .short('V')
                    .long("version")
                    .action(ArgAction::SetTrue)
                    .help("Print version"),
            );
        }
        self.version = Some(version.into());
        self
    }

    /// Accept `help <command>` as `<command> --help`
    pub fn add_help_command(mut self, enabled: bool) -> Self {
        self.add_help_command = enabled;
        self
    }

    /// Use `modules` to resolve locators and load command modules
    pub fn modules(mut self, modules: Modules<C>) -> Self {
        self.modules = modules;
        self
    }

    pub fn entry_points(mut self, entry_points: EntryPoints) -> Self {
        self.entry_points = entry_points;
        self
    }

    /// Apply settings from a configuration file
    pub fn configure(mut self, config: &CliConfig) -> Self {
        if let Some(prog) = &config.prog {
            self = self.prog(prog.clone());
        }
        if let Some(usage) = &config.usage {
            self = self.usage(usage.clone());
        }
        if let Some(description) = &config.description {
            self = self.description(description.clone());
        }
        if let Some(version) = &config.version {
            self = self.version(version.clone());
        }
        self.add_help_command = config.add_help_command;
        self.entry_points.merge(&config.entry_points);
        self
    }

    pub fn modules_mut(&mut self) -> &mut Modules<C> {
        &mut self.modules
    }

    /// Registry that module inits register into
    pub fn registry(&self) -> &LazyRegistry<C> {
        self.modules.registry()
    }

    /// Registered commands, sorted by name
    pub fn commands(&self) -> impl Iterator<Item = &CommandRecord<C>> {
        self.commands.values()
    }

    pub fn command(&self, name: &str) -> Option<&CommandRecord<C>> {
        self.commands.get(name)
    }

    /// Register a function adding options shared by every command
    pub fn add_generic_options<F>(&mut self, options: F)
    where
        F: Fn(Command) -> Command + 'static,
    {
        self.generic_options.push(Box::new(options));
    }

    /// Register a single shared option
    ///
    /// Mark it `global(true)` for its value to reach command handlers.
    pub fn add_generic_option(&mut self, arg: Arg) {
        self.add_generic_options(move |cmd| cmd.arg(arg.clone()));
    }

    /// Attach a command
    ///
    /// The name defaults to the setup function's identifier with `_`
    /// replaced by `-`. A later command with the same name replaces an
    /// earlier one.
    pub fn add_command(&mut self, setup: SetupFn, args: CommandArgs<C>) {
        let CommandArgs {
            main,
            name,
            context_kwargs,
        } = args;
        let name = name.unwrap_or_else(|| setup.name().replace('_', "-"));

        let (help, long) = parse_docstring(setup.doc());
        let description = (!long.is_empty()).then(|| format!("{}\n\n{}", help, long));

        let package = match setup.module() {
            Some(module) if main.is_relative() => Some(self.modules.package_of(module)),
            _ => None,
        };

        debug!(command = %name, main = %main, package = ?package, "adding command");
        self.commands.insert(
            name.clone(),
            CommandRecord {
                setup,
                main,
                name,
                help,
                description,
                context_kwargs,
                package,
            },
        );
    }

    /// Add every command registered in this app's registry and found in `source`
    pub fn load_commands<S>(&mut self, source: &S)
    where
        S: CommandSource + ?Sized,
    {
        let registry = std::rc::Rc::clone(self.modules.registry());
        self.load_commands_from(&registry, source);
    }

    /// Add every command registered in `registry` and found in `source`
    pub fn load_commands_from<S>(&mut self, registry: &LazyRegistry<C>, source: &S)
    where
        S: CommandSource + ?Sized,
    {
        registry.discover_and_call(source, |setup, args| self.add_command(setup, args));
    }

    /// Import a module by absolute dotted path and add its commands
    ///
    /// `:` is accepted as a separator, so `app:commands` is `app.commands`.
    pub fn load_module(&mut self, path: &str) -> Result<()> {
        let name = path.replace(':', ".");
        self.load_module_named(&name)
    }

    /// Like [`Cli::load_module`], resolving a leading `.` against the
    /// package of `caller`
    pub fn load_module_relative(&mut self, path: &str, caller: &str) -> Result<()> {
        let path = path.replace(':', ".");
        let package = self.modules.package_of(caller);
        let name = resolve_module_name(&path, &package)?;
        self.load_module_named(&name)
    }

    /// Add commands from every module listed under an entry point group
    ///
    /// Unknown groups load nothing.
    pub fn load_commands_from_entry_point(&mut self, group: &str) -> Result<()> {
        let modules = self.entry_points.group(group).to_vec();
        debug!(group, count = modules.len(), "loading entry point modules");
        for module in modules {
            self.load_module_named(&module)?;
        }
        Ok(())
    }

    fn load_module_named(&mut self, name: &str) -> Result<()> {
        let registry = std::rc::Rc::clone(self.modules.registry());
        let setups = self.modules.import(name)?.setups().to_vec();
        self.load_commands_from(&registry, &setups);
        Ok(())
    }

    /// Run the app, writing help and errors to the process streams
    ///
    /// Returns the exit status: 0 on success, 2 on argument errors, or
    /// whatever the handler returned.
    pub fn run<I, T>(&mut self, argv: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run_with(argv, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Run the app with explicit output streams
    pub fn run_with<I, T>(&mut self, argv: I, out: &mut dyn Write, err: &mut dyn Write) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if self.add_help_command && argv.first().is_some_and(|a| a == "help") {
            argv.remove(0);
            argv.push("--help".into());
        }

        if let Some(version) = &self.version {
            if requests_version(&argv) {
                writeln!(out, "{}", version)?;
                return Ok(EXIT_SUCCESS);
            }
        }

        let mut parser = self.build_parser();
        let matches = match parser.try_get_matches_from_mut(argv) {
            Ok(matches) => matches,
            Err(e) => {
                let rendered = e.render().to_string();
                if e.use_stderr() {
                    write!(err, "{}", rendered)?;
                } else {
                    write!(out, "{}", rendered)?;
                }
                return Ok(e.exit_code());
            }
        };

        if let Some(version) = &self.version {
            if matches.get_flag(VERSION_ARG) {
                writeln!(out, "{}", version)?;
                return Ok(EXIT_SUCCESS);
            }
        }

        let Some((name, args)) = matches.subcommand() else {
            writeln!(err, "{}", parser.render_help())?;
            return Ok(EXIT_USAGE);
        };

        if !self.commands.contains_key(name) {
            writeln!(err, "{}", parser.render_usage())?;
            return Ok(EXIT_USAGE);
        }
        self.dispatch(name, args)
    }

    fn dispatch(&mut self, name: &str, args: &ArgMatches) -> Result<i32> {
        let Some(record) = self.commands.get(name) else {
            return Ok(EXIT_USAGE);
        };
        let main = record.main.clone();
        let package = record.package.clone();

        let mut scope = self.context_factory.acquire(args, &record.context_kwargs)?;
        let handler: Handler<C> = self.modules.resolve(&main, package.as_deref())?;

        debug!(command = name, main = %main, "dispatching command");
        let status = handler(scope.context_mut(), args).map_err(CliError::Handler)?;
        drop(scope);

        Ok(status.unwrap_or(EXIT_SUCCESS))
    }

    fn build_parser(&self) -> Command {
        let mut cmd = Command::new(self.prog.clone().unwrap_or_else(default_prog))
            .no_binary_name(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .color(ColorChoice::Never)
            .subcommand_value_name("COMMAND")
            .subcommand_help_heading("Commands");

        if let Some(usage) = &self.usage {
            cmd = cmd.override_usage(usage.clone());
        }
        if let Some(description) = &self.description {
            cmd = cmd.about(description.clone());
        }

        for options in &self.generic_options {
            cmd = options(cmd);
        }

        for record in self.commands.values() {
            cmd = cmd.subcommand(record.subcommand());
        }

        cmd
    }
}

/// Whether `-V/--version` comes before the command name
///
/// The flag wins over anything after it, including an unknown command.
fn requests_version(argv: &[OsString]) -> bool {
    argv.iter()
        .take_while(|arg| arg.to_str().is_some_and(|a| a.starts_with('-') && a != "--"))
        .any(|arg| arg == "--version" || arg == "-V")
}

/// Program name from the running executable
fn default_prog() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROG.to_string())
}
