//! Command-line interface for splash
//! Walks directory trees through a splash pipeline and prints what comes out.
//!
//! Usage:
//!   splash walk `<paths>`... [--match `<re>`]... [--exclude `<re>`]... [--stage `<name[:pattern]>`]...
//!                        [--unique] [--shallow] [--skip-hidden] [--count] [--config `<file>`]
//!   splash list-transforms [--config `<file>`]
//!
//! Set `SPLASH_LOG` (e.g. `SPLASH_LOG=debug`) to see stage resolution and walk events.

use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches, Command};
use splash::config::{Loader, SplashConfig, UserConfig};
use splash::{
    BuiltinTransform, Chain, RegexMode, Result, Sequence, StageArgs, Stages, TransformRegistry,
};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in defaults (else $SPLASH_CONFIG, else ./splash.toml)");

    let matches = Command::new("splash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lazy pipelines over directory trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("walk")
                .about("Walk one or more roots and print the entries that survive the stages")
                .arg(
                    Arg::new("paths")
                        .help("Directories to walk")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("match")
                        .long("match")
                        .short('m')
                        .help("Keep entries matching this regex (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .short('x')
                        .help("Drop entries matching this regex (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("stage")
                        .long("stage")
                        .short('s')
                        .help("Apply a named stage, optionally with a pattern: name[:pattern]")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("unique")
                        .long("unique")
                        .short('u')
                        .help("Drop repeated entries")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("shallow")
                        .long("shallow")
                        .help("List direct children only")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("skip-hidden")
                        .long("skip-hidden")
                        .help("Skip dot-files and dot-directories")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .help("Print the number of entries instead of the entries")
                        .action(ArgAction::SetTrue),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("list-transforms")
                .about("List the stage names that can be used with --stage")
                .arg(config_arg),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("walk", walk_matches)) => handle_walk_command(walk_matches),
        Some(("list-transforms", list_matches)) => handle_list_transforms_command(list_matches),
        _ => unreachable!(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPLASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Defaults, then the user file, then flag overrides.
fn load_config(matches: &ArgMatches) -> Result<SplashConfig> {
    let explicit = matches.get_one::<String>("config").map(Path::new);
    let mut loader = Loader::new().with_user_config(&UserConfig::from_env(explicit));
    if flag(matches, "shallow") {
        loader = loader.set_override("walk.recursive", false)?;
    }
    if flag(matches, "skip-hidden") {
        loader = loader.set_override("walk.skip_hidden", true)?;
    }
    loader.build()
}

/// `get_flag` for flags only some subcommands define.
fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

fn build_registry(config: &SplashConfig) -> Result<TransformRegistry> {
    let mut registry = TransformRegistry::with_defaults();
    config.apply_aliases(&mut registry)?;
    Ok(registry)
}

/// Handle the walk command
fn handle_walk_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let registry = build_registry(&config)?.into_shared();

    let mut chain = Chain::with_registry(registry);
    if let Some(paths) = matches.get_many::<String>("paths") {
        chain.push_all(paths.cloned());
    }

    let flags = config.walk.flags();
    let mut view = if config.walk.recursive {
        chain.recursive_directory(flags)
    } else {
        chain.directory(flags)
    };
    if matches.get_flag("unique") {
        view = view.unique();
    }
    for pattern in matches.get_many::<String>("match").into_iter().flatten() {
        view = view.regex(pattern, RegexMode::Match);
    }
    for pattern in matches.get_many::<String>("exclude").into_iter().flatten() {
        view = view.inverse_regex(pattern);
    }
    for spec in matches.get_many::<String>("stage").into_iter().flatten() {
        let (name, args) = parse_stage(spec);
        view = view.apply_with(&name, args);
    }

    if matches.get_flag("count") {
        println!("{}", view.count()?);
    } else {
        for item in &view {
            println!("{}", item?);
        }
    }
    Ok(())
}

/// Split `name[:pattern]`.
fn parse_stage(spec: &str) -> (String, StageArgs) {
    match spec.split_once(':') {
        Some((name, pattern)) => (name.to_string(), StageArgs::new().pattern(pattern)),
        None => (spec.to_string(), StageArgs::new()),
    }
}

/// Handle the list-transforms command
fn handle_list_transforms_command(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let registry = build_registry(&config)?;

    println!("Built-in transforms:\n");
    for builtin in BuiltinTransform::ALL {
        println!("  {}", builtin);
    }
    println!("\nRegistered names:\n");
    for name in registry.names() {
        match config.aliases.get(name) {
            Some(target) => println!("  {} -> {}", name, target),
            None => println!("  {}", name),
        }
    }
    Ok(())
}
