use clap::{Arg, ArgAction, ArgMatches};
use colored::Colorize;
use std::process;
use subcli::config::parse_config;
use subcli::{setup_fn, Cli, CommandArgs, Modules, Scope};
use tracing::debug;

/// Configuration of the bundled demo app
const DEMO_CONFIG: &str = r#"
prog: subcli
description: Demo application for the subcli library
entry-points:
  subcli.commands: demo.commands
"#;

/// Context shared by the demo commands
struct Demo {
    greeting: String,
}

fn demo_modules() -> Modules<Demo> {
    let mut modules: Modules<Demo> = Modules::new();

    modules.define_package("demo", |m| {
        m.function("main", |ctx: &mut Demo, args: &ArgMatches| {
            let name = args.get_one::<String>("name").map(String::as_str).unwrap_or("world");
            let line = format!("{}, {}!", ctx.greeting, name);
            if args.get_flag("shout") {
                println!("{}", line.to_uppercase());
            } else {
                println!("{}", line);
            }
            Ok(None)
        });
        m.function("exit_main", |_: &mut Demo, args: &ArgMatches| {
            Ok(args.get_one::<i32>("code").copied())
        });
    });

    modules.define("demo.echo", |m| {
        m.function("main", |_: &mut Demo, args: &ArgMatches| {
            let words: Vec<&str> = args
                .get_many::<String>("words")
                .map(|w| w.map(String::as_str).collect())
                .unwrap_or_default();
            println!("{}", words.join(" "));
            Ok(None)
        });
    });

    modules.define("demo.commands", |m| {
        m.command(
            setup_fn! {
                /// Greet someone
                ///
                /// Prints a greeting. The greeting word comes from the
                /// command's context settings.
                fn greet(cmd) {
                    cmd.arg(Arg::new("name").long("name").value_name("NAME").help("Who to greet"))
                        .arg(Arg::new("shout").long("shout").action(ArgAction::SetTrue).help("Shout it"))
                }
            },
            CommandArgs::new(".").context_kwarg("greeting", "Hello"),
        );
        m.command(
            setup_fn! {
                /// Print the given words
                fn echo(cmd) {
                    cmd.arg(Arg::new("words").num_args(0..).help("Words to print"))
                }
            },
            CommandArgs::new(".echo"),
        );
        m.command(
            setup_fn! {
                /// Exit with the given status
                fn exit_with(cmd) {
                    cmd.arg(
                        Arg::new("code")
                            .required(true)
                            .value_parser(clap::value_parser!(i32))
                            .help("Exit status"),
                    )
                }
            },
            CommandArgs::new(":exit_main"),
        );
    });

    modules
}

fn run() -> subcli::Result<i32> {
    let config = parse_config(DEMO_CONFIG)?;

    let mut cli = Cli::with_scoped_context(|_: &ArgMatches, kwargs: &subcli::ContextKwargs| {
        let greeting = kwargs.get("greeting").cloned().unwrap_or_else(|| "Hi".to_string());
        Ok::<_, anyhow::Error>(Scope::with_teardown(Demo { greeting }, |_| {
            debug!("demo context released")
        }))
    })
    .configure(&config)
    .version(subcli::VERSION)
    .modules(demo_modules());

    cli.load_commands_from_entry_point("subcli.commands")?;
    cli.run(std::env::args_os().skip(1))
}

fn main() {
    // Logging is best effort
    let _ = subcli::logging::init_logging();

    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}
