//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueHint};

use crate::cli::error::{CliError, CliResult};

/// Console route dispatch: parse, match and run console commands against a route table
#[derive(Parser, Debug)]
#[command(name = "conharness")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Application config file with routes and console settings
    #[arg(short, long, global = true, env = "CONHARNESS_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch a command to the console application
    Run {
        /// Command line, e.g. `filter --id=10`
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show how a command line is parsed
    Parse {
        /// Command line to parse
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show the route a command line matches, without running it
    Match {
        /// Command line to match
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List routes in match order
    Routes,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}

/// Re-join shell-split arguments into one command string.
///
/// Arguments containing whitespace or a quote character are quoted again so the
/// console parser sees them as one token; for `--name=value` only the value is
/// quoted. The console parser has no escapes, so an argument holding both quote
/// kinds is rejected.
pub fn command_line(args: &[String]) -> CliResult<String> {
    let quoted = args
        .iter()
        .map(|arg| requote(arg))
        .collect::<CliResult<Vec<_>>>()?;
    Ok(quoted.join(" "))
}

fn requote(arg: &str) -> CliResult<String> {
    let has_double = arg.contains('"');
    let has_single = arg.contains('\'');
    if has_double && has_single {
        return Err(CliError::InvalidArgs(format!(
            "argument contains both quote characters: {arg}"
        )));
    }
    if !has_double && !has_single && !arg.contains(char::is_whitespace) {
        return Ok(arg.to_string());
    }
    let quote = if has_double { '\'' } else { '"' };
    Ok(match arg.split_once('=') {
        Some((name, value))
            if name.starts_with("--") && !name.contains([' ', '\t', '"', '\'']) =>
        {
            format!("{name}={quote}{value}{quote}")
        }
        _ => format!("{quote}{arg}{quote}"),
    })
}
