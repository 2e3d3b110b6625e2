//! Implementation of the `execgate check-path` command.

use crate::cli::CheckPathArgs;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::validate::SandboxPolicy;
use std::path::PathBuf;

/// Print the canonical form of `args.path` if it is inside the sandbox.
pub fn cmd_check_path(config: &GatewayConfig, args: &CheckPathArgs) -> Result<()> {
    let resolved = resolve(config, &args.path)?;
    println!("{}", resolved.display());
    Ok(())
}

fn resolve(config: &GatewayConfig, path: &str) -> Result<PathBuf> {
    config.validate()?;
    SandboxPolicy::new(&config.allowed_roots)?.resolve(path)
}
