//! Command implementations for execgate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the config/gateway setup they share.

mod check_path;
mod collect;
mod config;
mod run;

use crate::cli::{Cli, Command, ConfigAction, ExecArgs, GlobalArgs, ServeArgs};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::exec::ExecutionRequest;
use crate::exit_codes;
use crate::gateway::Gateway;
use crate::server;
use anyhow::Context;
use std::net::SocketAddr;

/// Dispatch a command to its implementation.
///
/// Returns the process exit code. Commands that run a child pass its
/// status through; the others return [`exit_codes::SUCCESS`].
pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let Cli { global, command } = cli;
    match command {
        Command::Run(args) => Ok(run::cmd_run(&gateway(&global)?, args).await?),
        Command::Collect(args) => Ok(collect::cmd_collect(&gateway(&global)?, args).await?),
        Command::CheckPath(args) => {
            check_path::cmd_check_path(&load_config(&global)?, &args)?;
            Ok(exit_codes::SUCCESS)
        }
        Command::Serve(args) => {
            cmd_serve(&global, args).await?;
            Ok(exit_codes::SUCCESS)
        }
        Command::Config(config_cmd) => match config_cmd.action {
            ConfigAction::Show => {
                config::cmd_config_show(&load_config(&global)?)?;
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}

/// Effective configuration: file (explicit or discovered) plus `--allow-root`.
fn load_config(global: &GlobalArgs) -> Result<GatewayConfig> {
    let config = GatewayConfig::discover(global.config.as_deref())?
        .with_extra_roots(global.allow_roots.iter().cloned());
    Ok(config)
}

fn gateway(global: &GlobalArgs) -> Result<Gateway> {
    Gateway::from_config(&load_config(global)?)
}

/// Build a request from `run`/`collect` arguments.
fn request_from_args(args: ExecArgs) -> Result<ExecutionRequest> {
    let mut words = args.command.into_iter();
    let program = words
        .next()
        .ok_or_else(|| GatewayError::UserError("no command given".to_string()))?;

    let mut request = ExecutionRequest::new(program, args.cwd).with_args(words);
    request.timeout_ms = args.timeout_ms;
    request.env.extend(args.env);
    Ok(request)
}

async fn cmd_serve(global: &GlobalArgs, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(global)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    let gateway = Gateway::from_config(&config)?;
    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.bind))?;
    server::serve(gateway, addr).await
}
