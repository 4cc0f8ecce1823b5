//! Common test utilities

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use subcli::clap::{Arg, ArgAction, ArgMatches, Command};
use subcli::{setup_fn, Cli, CommandArgs, EntryPoints, HandlerResult, Modules};

/// What the last dispatched handler saw
#[derive(Debug, Default)]
pub struct Calls {
    /// `module:function` of the handler that ran
    pub function: Option<String>,
    /// Value of the hidden `call` default set by the setup function
    pub call: Option<String>,
    /// Value of `--bar`
    pub bar: Option<bool>,
}

/// Context type used throughout the integration tests
pub type App = Rc<RefCell<Calls>>;

/// Handler recording its own location and the parsed arguments
pub fn recorder(label: &'static str) -> impl Fn(&mut App, &ArgMatches) -> HandlerResult {
    move |app: &mut App, args: &ArgMatches| {
        let mut calls = app.borrow_mut();
        calls.function = Some(label.to_string());
        calls.call = args.try_get_one::<String>("call").ok().flatten().cloned();
        calls.bar = args.try_get_one::<bool>("bar").ok().flatten().copied();
        Ok(None)
    }
}

/// `--bar` flag plus a hidden `call` default naming the setup function
pub fn with_bar(cmd: Command, call: &'static str) -> Command {
    cmd.arg(Arg::new("bar").long("bar").action(ArgAction::SetTrue))
        .arg(Arg::new("call").long("call").hide(true).default_value(call))
}

/// Module table mirroring a small application and a plugin package
pub fn fixture_modules() -> Modules<App> {
    let mut modules: Modules<App> = Modules::new();

    modules.define_package("tests", |_| {});

    modules.define_package("tests.fixtures", |m| {
        m.function("main", recorder("tests.fixtures:main"));
        m.function("foo_main", recorder("tests.fixtures:foo_main"));
    });

    modules.define("tests.fixtures.foo", |m| {
        m.function("main", recorder("tests.fixtures.foo:main"));
        m.function("foo_main", recorder("tests.fixtures.foo:foo_main"));
        m.function("bar_main", recorder("tests.fixtures.foo:bar_main"));

        m.command(
            setup_fn! { fn foo(cmd) { with_bar(cmd, "foo") } },
            CommandArgs::new("tests.fixtures.foo"),
        );
        m.command(
            setup_fn! { fn foo_main_dot(cmd) { with_bar(cmd, "foo_main_dot") } },
            CommandArgs::new("."),
        );
        m.command(
            setup_fn! { fn foo_main_absolute_colon(cmd) { with_bar(cmd, "foo_main_absolute_colon") } },
            CommandArgs::new("tests.fixtures.foo:foo_main"),
        );
        m.command(
            setup_fn! { fn foo_main_dotted(cmd) { with_bar(cmd, "foo_main_dotted") } },
            CommandArgs::new("tests.fixtures.foo.foo_main"),
        );
        m.command(
            setup_fn! { fn foo_main_relative_leading_dot(cmd) { with_bar(cmd, "foo_main_relative_leading_dot") } },
            CommandArgs::new(".foo_main"),
        );
        m.command(
            setup_fn! { fn foo_main_relative_leading_colon(cmd) { with_bar(cmd, "foo_main_relative_leading_colon") } },
            CommandArgs::new(":foo_main"),
        );
        m.command(
            setup_fn! { fn bar_options(cmd) { with_bar(cmd, "bar_options") } },
            CommandArgs::new(".foo:bar_main").name("bar"),
        );
    });

    modules.define_package("fakeapp", |_| {});

    modules.define("fakeapp.commands", |m| {
        m.command(
            setup_fn! {
                /// Hello world
                ///
                /// This is a long command.
                fn foo(cmd) {
                    with_bar(cmd, "foo")
                }
            },
            CommandArgs::new(".foo"),
        );
    });

    modules.define("fakeapp.foo", |m| {
        m.function("main", recorder("fakeapp.foo:main"));
    });

    modules
}

/// Entry points advertising the plugin package
pub fn fixture_entry_points() -> EntryPoints {
    let mut entry_points = EntryPoints::new();
    entry_points.add("cli.commands", "fakeapp.commands");
    entry_points
}

/// App whose context is `app`, with the fixture modules available
pub fn make_cli() -> (Cli<App>, App) {
    let app: App = Rc::default();
    let shared = Rc::clone(&app);
    let cli = Cli::with_context(move |_, _| Ok(Rc::clone(&shared)))
        .prog("prog")
        .modules(fixture_modules())
        .entry_points(fixture_entry_points());
    (cli, app)
}

/// Run `argv`, capturing status, stdout and stderr
pub fn run(cli: &mut Cli<App>, argv: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = cli
        .run_with(argv.iter().copied(), &mut out, &mut err)
        .expect("run failed");
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}
