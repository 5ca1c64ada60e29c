//! Command execution

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::ConsoleApplication;
use crate::cli::args::{command_line, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_path, AppConfig};
use crate::domain::{self, FlagValue, RouteMatch};
use crate::exitcode;

/// Execute the selected command and return the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    match &cli.command {
        Some(Commands::Run { args }) => cmd_run(cli, args),
        Some(Commands::Parse { args }) => cmd_parse(args),
        Some(Commands::Match { args }) => cmd_match(cli, args),
        Some(Commands::Routes) => cmd_routes(cli),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `conharness --help`".into(),
        )),
    }
}

fn load_config(cli: &Cli) -> CliResult<AppConfig> {
    let path = cli.config.as_deref().map(expand_path);
    debug!("load_config: {:?}", path);
    Ok(AppConfig::load(path.as_deref())?)
}

#[instrument(skip(cli))]
fn cmd_run(cli: &Cli, args: &[String]) -> CliResult<i32> {
    let command = command_line(args)?;
    if command.trim().is_empty() {
        return Err(CliError::InvalidArgs("empty command".into()));
    }
    let config = load_config(cli)?;
    let mut app = ConsoleApplication::from_config(&config)?;
    let status = app.run(&command)?;
    debug!(status, "run finished");
    Ok(status)
}

#[instrument]
fn cmd_parse(args: &[String]) -> CliResult<i32> {
    let parsed = domain::parse(&command_line(args)?);

    output::header("Positionals");
    for positional in parsed.positionals() {
        output::detail(positional);
    }
    output::header("Flags");
    for (name, value) in parsed.flags() {
        match value {
            FlagValue::Present => output::detail(&format!("--{name}")),
            FlagValue::Value(v) => output::detail(&format!("--{name} = {v:?}")),
        }
    }
    Ok(exitcode::OK)
}

#[instrument(skip(cli))]
fn cmd_match(cli: &Cli, args: &[String]) -> CliResult<i32> {
    let config = load_config(cli)?;
    let app = ConsoleApplication::from_config(&config)?;

    match app.match_command(&command_line(args)?) {
        Some(route_match) => {
            print_route_match(&route_match);
            Ok(exitcode::OK)
        }
        None => {
            output::warning("no route matched");
            Ok(exitcode::FAILURE)
        }
    }
}

fn print_route_match(route_match: &RouteMatch) {
    output::success(&format!(
        "matched route: {}",
        route_match.matched_route_name().unwrap_or("-")
    ));
    for (name, value) in route_match.params() {
        output::detail(&format!("{name} = {value}"));
    }
}

#[instrument(skip(cli))]
fn cmd_routes(cli: &Cli) -> CliResult<i32> {
    let config = load_config(cli)?;
    let app = ConsoleApplication::from_config(&config)?;

    if app.router().is_empty() {
        output::warning("no routes configured");
        return Ok(exitcode::OK);
    }
    for route in app.router().routes() {
        output::action(route.name(), route.definition());
        if route.priority() != 0 {
            output::detail(&format!("priority: {}", route.priority()));
        }
        for (name, value) in route.defaults() {
            output::detail(&format!("default {name} = {value}"));
        }
    }
    Ok(exitcode::OK)
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            let config = load_config(cli)?;
            output::info(&config.to_toml()?);
        }
        ConfigCommands::Template => output::info(&AppConfig::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::action("global", &format!("{} ({state})", path.display()));
                }
                None => output::warning("cannot determine global config directory"),
            }
            match cli.config.as_deref().map(expand_path) {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::action("app", &format!("{} ({state})", path.display()));
                }
                None => output::detail("app: none (use --config)"),
            }
        }
    }
    Ok(exitcode::OK)
}

fn cmd_completion(shell: Shell) -> CliResult<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = io::stdout();
    generate(shell, &mut cmd, name, &mut stdout);
    io::Write::flush(&mut stdout).map_err(|e| CliError::io("write completions", e))?;
    Ok(exitcode::OK)
}
