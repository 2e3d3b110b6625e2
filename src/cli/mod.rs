//! CLI argument parsing for execgate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::logging::{LogFormat, TracingConfig};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// execgate: sandboxed command execution with streamed output.
///
/// Every command runs directly (never through a shell) in a working
/// directory that must resolve inside one of the allowed roots.
#[derive(Parser, Debug)]
#[command(name = "execgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the configuration file (default: ./execgate.yaml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Additional allowed root (repeatable); appended to the configured roots.
    #[arg(long = "allow-root", global = true)]
    pub allow_roots: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            verbose: self.verbose,
            quiet: self.quiet,
            format: self.log_format,
        }
    }
}

/// Available commands for execgate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command and stream its output to this terminal.
    ///
    /// stdout and stderr are forwarded as they arrive. Exits with the
    /// command's exit code, 124 on timeout, 127 if it could not start.
    Run(ExecArgs),

    /// Run a command to completion and print the buffered result.
    Collect(CollectArgs),

    /// Resolve a working directory against the sandbox.
    ///
    /// Prints the canonical path, or the violation and exits 77.
    CheckPath(CheckPathArgs),

    /// Serve the HTTP transport.
    Serve(ServeArgs),

    /// Configuration commands.
    Config(ConfigCommand),
}

/// What to run and where.
#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Working directory for the command.
    #[arg(long, default_value = ".")]
    pub cwd: String,

    /// Wall-clock budget in milliseconds (0 disables; default from config).
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Extra environment variable for the command (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// The program followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for the `collect` command.
#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Print the JSON response instead of the raw output.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub exec: ExecArgs,
}

/// Arguments for the `check-path` command.
#[derive(Args, Debug, Clone)]
pub struct CheckPathArgs {
    /// Directory to check.
    pub path: String,
}

/// Arguments for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address (overrides `bind` in the config).
    #[arg(long)]
    pub bind: Option<String>,
}

/// Config subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Available config actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as YAML.
    Show,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
